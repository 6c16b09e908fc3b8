//! Bitsy - startup sequencer and provisioner for a Raspberry Pi voice robot.
//!
//! The [`sequencer`] gates the voice application behind hardware and file
//! readiness checks, then launches it as a detached process. The
//! [`provision`] module performs the one-time setup the sequencer relies on.

pub mod check;
pub mod launcher;
pub mod options;
pub mod permissions;
pub mod process;
pub mod provision;
pub mod sequencer;
pub mod startup_log;

pub use bitsy_shared::{BitsyError, BitsyResult, StartupLayout, constants};
pub use check::{CheckId, CheckReport, EvaluationMode, ReadinessCheck, Requirement};
pub use launcher::{DetachedLauncher, LaunchSpec, Launcher};
pub use options::SequencerOptions;
pub use provision::{ProvisionOptions, Provisioner};
pub use sequencer::{LaunchReport, StartupSequencer};
pub use startup_log::{FileLog, LogRecord, MemoryLog, Severity, StartupLog};
