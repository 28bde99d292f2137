//! Service hook resolution.
//!
//! [`ServiceHooks`] turns the sidecar configuration's argv lists into
//! [`Command`]s rebound to execute inside the chroot. The configuration is
//! loaded fresh on every call, never cached.

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};

use crate::command::Command;
use crate::config;

/// Resolves configured start/stop hooks for one chroot root.
pub struct ServiceHooks {
    root: Utf8PathBuf,
}

impl ServiceHooks {
    /// Creates a resolver for `root`.
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
        }
    }

    fn rebound(&self, lists: Vec<Vec<String>>) -> Vec<Command> {
        lists
            .into_iter()
            .map(|argv| Command::new(argv).in_chroot(&self.root))
            .collect()
    }

    /// The configured start hooks, rebound into the chroot. Empty when no
    /// sidecar file or no `start` key exists.
    pub fn start_commands(&self) -> Result<Vec<Command>> {
        Ok(self.rebound(config::load(&self.root)?.start))
    }

    /// The configured stop hooks, rebound into the chroot. Empty when no
    /// sidecar file or no `stop` key exists.
    pub fn stop_commands(&self) -> Result<Vec<Command>> {
        Ok(self.rebound(config::load(&self.root)?.stop))
    }
}
