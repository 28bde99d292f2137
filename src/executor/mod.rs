//! Command execution abstraction for chrootctl.
//!
//! This module provides:
//! - [`ProcResult`]: captured outcome of one finished command
//! - [`CommandExecutor`]: trait for command execution strategies
//! - [`RealCommandExecutor`]: production implementation using `std::process`
//!
//! The trait is the injection seam that keeps the lifecycle controller
//! testable: tests substitute a recording executor and no real mounting or
//! bootstrapping occurs.

mod real;

use std::fs::File;
use std::process::ExitStatus;

use anyhow::Result;

use crate::command::Command;

pub use real::RealCommandExecutor;

/// Result of running exactly one command to completion.
///
/// Terminal value: never mutated after capture. For interactive and
/// file-redirected runs the corresponding output buffers stay empty.
#[derive(Debug)]
pub struct ProcResult {
    /// Exit status of the command.
    pub status: ExitStatus,
    /// Captured stdout bytes.
    pub stdout: Vec<u8>,
    /// Captured stderr bytes.
    pub stderr: Vec<u8>,
}

impl ProcResult {
    /// Returns true if the command exited with status zero.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Returns true if the command exited non-zero or died to a signal.
    pub fn failed(&self) -> bool {
        !self.success()
    }

    /// Returns the exit code if the command exited normally.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Human-readable status ("exit status: 1", "signal: 9 (SIGKILL)").
    pub fn status_display(&self) -> String {
        self.status.to_string()
    }

    /// Builds a result from a raw wait status.
    ///
    /// Exit codes live in the high byte (`code << 8`), matching `wait(2)`.
    /// Primarily useful for scripted executors in tests.
    pub fn from_raw_exit(raw: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        use std::os::unix::process::ExitStatusExt;
        Self {
            status: ExitStatus::from_raw(raw),
            stdout,
            stderr,
        }
    }
}

/// Trait for command execution.
///
/// Implementations must be `Send + Sync` so an executor can be shared via
/// `Arc<dyn CommandExecutor>` across the lifecycle components.
pub trait CommandExecutor: Send + Sync {
    /// Runs a command to completion, feeding its stdin bytes and capturing
    /// stdout and stderr fully.
    fn execute(&self, command: &Command) -> Result<ProcResult>;

    /// Runs a command attached to the controlling terminal: stdin, stdout
    /// and stderr are inherited, nothing is captured. Blocks until exit.
    ///
    /// Used only by the interactive enter path.
    fn execute_interactive(&self, command: &Command) -> Result<ProcResult>;

    /// Runs a command with stdout redirected to an open file and stderr
    /// captured. Used only by the dump path.
    fn execute_to_file(&self, command: &Command, stdout: File) -> Result<ProcResult>;
}
