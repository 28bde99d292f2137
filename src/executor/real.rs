//! Real command executor implementation.
//!
//! Commands are resolved through PATH with `which` before spawning, so a
//! missing executable surfaces as [`ChrootctlError::CommandNotFound`] rather
//! than a spawn error from the OS.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command as StdCommand, Stdio};
use std::thread;

use anyhow::{Context, Result};
use which::which;

use super::{CommandExecutor, ProcResult};
use crate::command::Command;
use crate::error::ChrootctlError;

/// Kills and reaps a child process after an internal error.
fn cleanup_child_process(child: &mut Child) {
    let pid = child.id();
    if let Err(e) = child.kill() {
        tracing::debug!(pid = pid, "kill returned error (process may have already exited): {}", e);
    }
    if let Err(e) = child.wait() {
        tracing::warn!(pid = pid, "failed to wait for child process after kill: {}", e);
    }
}

/// Command executor that runs actual system commands.
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    /// Resolves a command's program through PATH.
    fn resolve(&self, command: &Command) -> Result<PathBuf> {
        let program = command.program().ok_or_else(|| {
            ChrootctlError::Validation("cannot execute a command with an empty argv".to_string())
        })?;
        let path = which(program).map_err(|e| ChrootctlError::CommandNotFound {
            command: program.to_string(),
            source: e,
        })?;
        tracing::trace!("command found: {}: {}", program, path.to_string_lossy());
        Ok(path)
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, command: &Command) -> Result<ProcResult> {
        let program = self.resolve(command)?;

        let mut std_command = StdCommand::new(program);
        std_command
            .args(command.args())
            .stdin(if command.stdin().is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = std_command
            .spawn()
            .with_context(|| format!("failed to spawn command {}", command))?;
        tracing::trace!("spawned command: {}: pid={}", command, child.id());

        // Feed stdin from a separate thread; wait_with_output drains stdout
        // and stderr concurrently, so the writer cannot deadlock against a
        // full output pipe.
        let writer = match (command.stdin().map(<[u8]>::to_vec), child.stdin.take()) {
            (Some(bytes), Some(mut pipe)) => {
                let spawned = thread::Builder::new()
                    .name("stdin-writer".to_string())
                    .spawn(move || {
                        if let Err(e) = pipe.write_all(&bytes) {
                            tracing::debug!("stdin write ended early: {}", e);
                        }
                    });
                match spawned {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        cleanup_child_process(&mut child);
                        return Err(ChrootctlError::Execution {
                            command: command.to_string(),
                            status: format!("failed to spawn stdin writer thread: {}", e),
                            output: String::new(),
                        }
                        .into());
                    }
                }
            }
            _ => None,
        };

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for command {}", command))?;

        if let Some(handle) = writer
            && handle.join().is_err()
        {
            tracing::warn!("stdin writer thread panicked for {}", command);
        }

        tracing::trace!("executed command: {}: success={}", command, output.status.success());

        Ok(ProcResult {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn execute_interactive(&self, command: &Command) -> Result<ProcResult> {
        let program = self.resolve(command)?;

        // Inherited stdio: the child owns the terminal until it exits.
        let status = StdCommand::new(program)
            .args(command.args())
            .status()
            .with_context(|| format!("failed to spawn interactive command {}", command))?;

        tracing::trace!("interactive command finished: {}: {}", command, status);

        Ok(ProcResult {
            status,
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }

    fn execute_to_file(&self, command: &Command, stdout: File) -> Result<ProcResult> {
        let program = self.resolve(command)?;

        let child = StdCommand::new(program)
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn command {}", command))?;

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for command {}", command))?;

        Ok(ProcResult {
            status: output.status,
            stdout: Vec::new(),
            stderr: output.stderr,
        })
    }
}
