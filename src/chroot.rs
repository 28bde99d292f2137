//! Chroot lifecycle controller.
//!
//! [`Chroot`] composes the mount manager and service hook resolution into
//! the start/stop/enter operations, enforcing the ordering and recovery
//! contracts between mounting and hook execution:
//!
//! - start: prepare mounts, run start hooks fail-fast; a hook failure rolls
//!   the chroot all the way back down (stop hooks + teardown) before the
//!   error surfaces. On success the mounts stay live.
//! - stop: run stop hooks best-effort, then teardown unconditionally.
//!   Idempotent; safe on a chroot that was never started.
//! - enter: prepare mounts, attach an interactive chroot session to the
//!   controlling terminal, tear down after it exits however it exits.

use std::sync::Arc;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::command::Command;
use crate::executor::{CommandExecutor, ProcResult};
use crate::hooks::ServiceHooks;
use crate::mounts::ChrootMounts;
use crate::sequence::{run_anyway, run_till_success};

/// Lifecycle controller for one chroot root.
///
/// The root is fixed at construction; the sidecar configuration is re-read
/// on every operation.
pub struct Chroot {
    root: Utf8PathBuf,
    executor: Arc<dyn CommandExecutor>,
}

impl Chroot {
    /// Creates a controller for `root`. The path must already be validated
    /// as an existing directory.
    pub fn new(root: &Utf8Path, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            root: root.to_owned(),
            executor,
        }
    }

    /// The chroot's base directory.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn mounts(&self) -> ChrootMounts {
        ChrootMounts::new(&self.root, self.executor.clone())
    }

    /// Mounts the kernel filesystems and runs the configured start hooks.
    ///
    /// On success the chroot is left live and mounted. A failing hook rolls
    /// everything back via [`stop()`](Self::stop) before the hook's error
    /// surfaces.
    pub fn start(&self) -> Result<()> {
        let start_commands = ServiceHooks::new(&self.root).start_commands()?;

        let mut mounts = self.mounts();
        mounts.prepare()?;

        if start_commands.is_empty() {
            info!("no start hooks configured for {}", self.root);
            mounts.persist();
            return Ok(());
        }

        info!("running {} start hook(s) in {}", start_commands.len(), self.root);
        match run_till_success(&*self.executor, &start_commands) {
            Ok(_) => {
                mounts.persist();
                Ok(())
            }
            Err(e) => {
                // stop() owns the full rollback from here
                mounts.persist();
                if let Err(stop_err) = self.stop() {
                    warn!("cleanup stop after failed start also failed: {:#}", stop_err);
                }
                Err(e)
            }
        }
    }

    /// Runs the configured stop hooks best-effort, then unmounts.
    ///
    /// Teardown runs even when hooks fail or the sidecar configuration is
    /// malformed; a configuration error surfaces only after the mounts are
    /// gone.
    pub fn stop(&self) -> Result<()> {
        let stop_commands = ServiceHooks::new(&self.root).stop_commands();

        if let Ok(commands) = &stop_commands {
            if !commands.is_empty() {
                info!("running {} stop hook(s) in {}", commands.len(), self.root);
            }
            run_anyway(&*self.executor, commands);
        }

        self.mounts().teardown();
        stop_commands.map(|_| ())
    }

    /// Runs an interactive session inside the chroot.
    ///
    /// With an empty `argv` the chroot's default shell runs; otherwise the
    /// given command does. The session inherits the controlling terminal.
    /// Teardown runs after the session ends, normally or not; an abnormal
    /// session exit is reported in the returned [`ProcResult`], not as an
    /// error.
    pub fn enter(&self, argv: &[String]) -> Result<ProcResult> {
        let mut mounts = self.mounts();
        mounts.prepare()?;

        let session = Command::new(argv.to_vec()).in_chroot(&self.root);
        info!("entering {}", self.root);
        let result = self.executor.execute_interactive(&session);

        mounts.teardown();
        result
    }
}
