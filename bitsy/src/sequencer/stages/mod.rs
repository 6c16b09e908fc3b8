//! Startup stages.
//!
//! Each stage is a function with typed input/output, run in this order:
//! settle, readiness, permissions, launch.

pub mod launch;
pub mod permissions;
pub mod readiness;
pub mod settle;
