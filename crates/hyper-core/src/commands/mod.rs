//! # Hyper Core Commands
//!
//! Runs a registered [`Command`](crate::capability::Command) as its own tokio
//! task and maps its outcome to a process exit code. An interrupt aborts the
//! command task only; the plugin registry and service container stay intact.
//! [`Subprocess`] runs external programs for commands.
pub mod init;
pub mod process;
pub mod runner;

pub use init::InitCommand;
pub use process::{ProcessOutput, Stream, Subprocess};
pub use runner::{CommandOutcome, CommandRunner};

/// Process exit codes
pub struct ExitStatus;

impl ExitStatus {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const APPLICATION_ERROR: i32 = 2;
    pub const INTERRUPTED: i32 = 130;
}

#[cfg(test)]
mod tests;
