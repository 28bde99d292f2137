//! Kernel filesystem mounts for a chroot.
//!
//! [`ChrootMounts`] derives the fixed set of bind-mounts a chroot needs to
//! behave like a real root filesystem (`/proc`, `/sys`, `/dev`, `/dev/pts`)
//! from the root path. Mounts are established fail-fast in a fixed order and
//! reversed best-effort in the opposite order, with a `Drop` guard backing
//! the pairing invariant on early-return and panic paths.

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::command::Command;
use crate::error::ChrootctlError;
use crate::executor::CommandExecutor;
use crate::sequence::{run_anyway, run_till_success};

/// Validates that no component of a mount target inside the root is a
/// symlink. A symlinked target would redirect the mount outside the chroot.
fn validate_no_symlinks(root: &Utf8Path, target: &Utf8Path) -> Result<()> {
    let relative = target.strip_prefix(root).unwrap_or(target);
    let mut current = root.to_path_buf();

    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(metadata) => {
                if metadata.file_type().is_symlink() {
                    return Err(ChrootctlError::Validation(format!(
                        "symlink detected at {} in mount target path {}; \
                        this could redirect the mount outside the chroot",
                        current, target,
                    ))
                    .into());
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Remaining components don't exist; the mount itself will fail
                // with a proper error if the target is genuinely missing.
                break;
            }
            Err(e) => {
                return Err(ChrootctlError::io(
                    format!("failed to check mount target path component: {}", current),
                    e,
                )
                .into());
            }
        }
    }

    Ok(())
}

/// Mount/unmount controller for one chroot root.
///
/// The preparation sequence is the four mounts in fixed order followed by
/// removal of a stale `/etc/mtab` inside the chroot; the teardown sequence
/// is the four unmounts in reverse order, run best-effort so it is safe to
/// call with some or none of the mounts established.
pub struct ChrootMounts {
    root: Utf8PathBuf,
    preparation: Vec<Command>,
    teardown_sequence: Vec<Command>,
    executor: Arc<dyn CommandExecutor>,
    armed: bool,
}

impl ChrootMounts {
    /// Creates a controller for `root`. No commands run until
    /// [`prepare()`](Self::prepare) or [`teardown()`](Self::teardown).
    pub fn new(root: &Utf8Path, executor: Arc<dyn CommandExecutor>) -> Self {
        let proc_path = root.join("proc");
        let sys_path = root.join("sys");
        let dev_path = root.join("dev");
        let dev_pts_path = root.join("dev/pts");

        let preparation = vec![
            Command::from_tokens(["mount", "-t", "proc", "proc", proc_path.as_str()]),
            Command::from_tokens(["mount", "-t", "sysfs", "sys", sys_path.as_str()]),
            Command::from_tokens(["mount", "-o", "bind", "/dev", dev_path.as_str()]),
            Command::from_tokens(["mount", "-o", "bind", "/dev/pts", dev_pts_path.as_str()]),
            Command::from_tokens(["rm", "-f", "/etc/mtab"]).in_chroot(root),
        ];
        let teardown_sequence = vec![
            Command::from_tokens(["umount", dev_pts_path.as_str()]),
            Command::from_tokens(["umount", dev_path.as_str()]),
            Command::from_tokens(["umount", sys_path.as_str()]),
            Command::from_tokens(["umount", proc_path.as_str()]),
        ];

        Self {
            root: root.to_owned(),
            preparation,
            teardown_sequence,
            executor,
            armed: false,
        }
    }

    /// The four mount targets inside the root, in mount order.
    fn mount_targets(&self) -> [Utf8PathBuf; 4] {
        [
            self.root.join("proc"),
            self.root.join("sys"),
            self.root.join("dev"),
            self.root.join("dev/pts"),
        ]
    }

    /// Establishes the kernel filesystem mounts, fail-fast.
    ///
    /// If any preparation step fails, whatever was mounted is reversed
    /// best-effort before the failure propagates. On success the `Drop`
    /// guard is armed; call [`persist()`](Self::persist) when the mounts
    /// must outlive this value.
    pub fn prepare(&mut self) -> Result<()> {
        debug_assert!(!self.armed, "prepare() called on already-prepared ChrootMounts");

        for target in self.mount_targets() {
            validate_no_symlinks(&self.root, &target)?;
        }

        info!("mounting kernel filesystems in {}", self.root);
        match run_till_success(&*self.executor, &self.preparation) {
            Ok(_) => {
                self.armed = true;
                Ok(())
            }
            Err(e) => {
                self.teardown();
                Err(e)
            }
        }
    }

    /// Reverses the mounts in reverse mount order, best-effort.
    ///
    /// Never fails outward: unmount failures are expected whenever some or
    /// all of the mounts were never established, and are logged at debug
    /// level only.
    pub fn teardown(&mut self) {
        info!("unmounting kernel filesystems from {}", self.root);
        run_anyway(&*self.executor, &self.teardown_sequence);
        self.armed = false;
    }

    /// Disarms the `Drop` guard, leaving the mounts in place.
    ///
    /// Used by a successful start, whose whole point is a live mounted
    /// chroot after the process returns.
    pub fn persist(mut self) {
        self.armed = false;
    }
}

impl Drop for ChrootMounts {
    fn drop(&mut self) {
        if self.armed {
            warn!("chroot mounts for {} still armed; tearing down", self.root);
            self.teardown();
        }
    }
}
