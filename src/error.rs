//! Domain-specific error types for chrootctl.
//!
//! This module defines `ChrootctlError`, a `thiserror`-based enum with typed
//! variants for the failure modes the lifecycle tools distinguish. Public API
//! functions return `Result<T, ChrootctlError>` where the caller can react to
//! the kind; trait boundaries use `anyhow::Result` and rely on the automatic
//! `Into<anyhow::Error>` conversion.

use std::io;

use crate::command::Command;
use crate::executor::ProcResult;

/// Formats an IO error kind into a human-readable message.
///
/// Common kinds get a stable short form ("I/O error: not found") instead of
/// the OS-level text ("No such file or directory (os error 2)"); anything
/// else falls back to the OS message. The path or operation context is
/// carried separately in `ChrootctlError::Io { context }`.
pub(crate) fn io_error_kind_message(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "I/O error: not found".to_string(),
        io::ErrorKind::PermissionDenied => "I/O error: permission denied".to_string(),
        io::ErrorKind::AlreadyExists => "I/O error: already exists".to_string(),
        io::ErrorKind::IsADirectory => "I/O error: is a directory".to_string(),
        _ => format!("I/O error: {}", err),
    }
}

/// Domain-specific error type for chrootctl.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ChrootctlError {
    /// A validation constraint was violated (bad path, out-of-range count,
    /// precondition violation). Detected before any external command runs.
    #[error("validation error: {0}")]
    Validation(String),

    /// The executable named by a command could not be found in PATH.
    ///
    /// Spawn failures are surfaced as this distinct startup error rather
    /// than as a synthetic non-zero `ProcResult`.
    #[error("command not found in PATH: {command}")]
    CommandNotFound {
        /// The program name that failed to resolve.
        command: String,
        #[source]
        source: which::Error,
    },

    /// An external command ran and exited unsuccessfully.
    #[error("command execution failed: {command}: {status}{output}")]
    Execution {
        /// The argv of the command that was executed, debug-quoted.
        command: String,
        /// Exit status description (code or terminating signal).
        status: String,
        /// Captured stderr followed by stdout, prefixed with a newline,
        /// or empty when the command produced no output.
        output: String,
    },

    /// The sidecar configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O operation failed with contextual information.
    #[error("{context}: {message}")]
    Io {
        /// What was being done when the error occurred, usually a path or
        /// an operation description including a path.
        context: String,
        /// Human-readable description derived from [`io_error_kind_message`].
        message: String,
        /// The underlying I/O error, preserved for programmatic inspection.
        #[source]
        source: std::io::Error,
    },
}

impl ChrootctlError {
    /// Creates an `Io` variant with `message` derived from `source`.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: io_error_kind_message(&source),
            source,
        }
    }

    /// Creates an `Execution` variant from a finished command.
    ///
    /// Captured stderr is emitted before stdout, matching the order the
    /// original tools reported failures in.
    pub(crate) fn execution(command: &Command, result: &ProcResult) -> Self {
        let mut output = String::new();
        for stream in [&result.stderr, &result.stdout] {
            let text = String::from_utf8_lossy(stream);
            let text = text.trim_end();
            if !text.is_empty() {
                output.push('\n');
                output.push_str(text);
            }
        }
        Self::Execution {
            command: command.to_string(),
            status: result.status_display(),
            output,
        }
    }
}
