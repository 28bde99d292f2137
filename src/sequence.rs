//! Ordered command sequencing policies.
//!
//! Two policies over a list of [`Command`]s, both strictly sequential (each
//! command's completion is observed before the next one starts):
//!
//! - [`run_till_success`]: fail-fast; stops at the first failure and surfaces
//!   it as a typed [`ChrootctlError::Execution`] carrying the captured output.
//! - [`run_anyway`]: best-effort; every command runs regardless of individual
//!   failures and all results are discarded. Used where cleanup must proceed
//!   even when single steps misbehave.

use anyhow::Result;
use tracing::debug;

use crate::command::Command;
use crate::error::ChrootctlError;
use crate::executor::{CommandExecutor, ProcResult};

/// Runs commands in order, stopping at the first failure.
///
/// A non-zero exit becomes an `Execution` error; executor-level errors
/// (missing program) propagate as-is. The remainder of the list is skipped
/// in both cases. On success the last command's result is returned.
///
/// Calling this with an empty list is a precondition violation at the call
/// site and yields a `Validation` error; callers with possibly-empty lists
/// must guard before calling.
pub fn run_till_success(
    executor: &dyn CommandExecutor,
    commands: &[Command],
) -> Result<ProcResult> {
    let Some((last, head)) = commands.split_last() else {
        return Err(ChrootctlError::Validation(
            "run_till_success requires at least one command".to_string(),
        )
        .into());
    };

    for command in head {
        let result = executor.execute(command)?;
        if result.failed() {
            return Err(ChrootctlError::execution(command, &result).into());
        }
    }

    let result = executor.execute(last)?;
    if result.failed() {
        return Err(ChrootctlError::execution(last, &result).into());
    }
    Ok(result)
}

/// Runs every command in order, ignoring individual failures.
///
/// Failures (and even spawn errors) are logged at debug level and otherwise
/// swallowed; nothing is returned.
pub fn run_anyway(executor: &dyn CommandExecutor, commands: &[Command]) {
    for command in commands {
        match executor.execute(command) {
            Ok(result) if result.failed() => {
                debug!("ignoring failure of {}: {}", command, result.status_display());
            }
            Ok(_) => {}
            Err(e) => {
                debug!("ignoring error running {}: {:#}", command, e);
            }
        }
    }
}
