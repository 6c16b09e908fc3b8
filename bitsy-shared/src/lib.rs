//! Bitsy Shared - common code for the sequencer, provisioner and CLI
//!
//! This crate contains the error type, well-known constants and the
//! on-disk layout used by every other crate in the workspace.

pub mod constants;
pub mod errors;
pub mod layout;

pub use errors::{BitsyError, BitsyResult};
pub use layout::StartupLayout;
