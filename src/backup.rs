//! Incremental chroot backups.
//!
//! A backup folder holds integer-named snapshot directories; the highest
//! index is the most recent. Each new snapshot is synchronized with rsync,
//! hard-link-deduplicated against the previous snapshot via `--link-dest`,
//! and older snapshots beyond the retention count are pruned afterwards.

use std::fs;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::command::Command;
use crate::error::ChrootctlError;
use crate::executor::CommandExecutor;
use crate::sequence::run_till_success;

/// Paths excluded from synchronization: dynamic or virtual trees that must
/// not be carried into a snapshot.
const SYNC_EXCLUDES: [&str; 9] = [
    "/dev/*",
    "/proc/*",
    "/sys/*",
    "/tmp/*",
    "/run/*",
    "/mnt/*",
    "/media/*",
    "/lost+found",
    "/home/*/.gvfs",
];

/// rsync flag set: recursive, preserve hard links, symlinks, ownership,
/// timestamps, devices and permissions, mirror deletions.
const SYNC_FLAGS: [&str; 10] = ["-r", "-h", "-H", "-l", "-g", "-o", "-t", "-D", "-p", "--del"];

/// A flat directory of integer-named snapshot directories.
pub struct BackupSet {
    dir: Utf8PathBuf,
}

impl BackupSet {
    /// Creates a view over `dir`. The directory must already exist.
    pub fn new(dir: &Utf8Path) -> Self {
        Self {
            dir: dir.to_owned(),
        }
    }

    /// The path of the snapshot directory with the given index.
    pub fn path_for(&self, index: u64) -> Utf8PathBuf {
        self.dir.join(index.to_string())
    }

    /// Enumerates existing snapshot indexes, ascending.
    ///
    /// Entries that are not integer-named directories are skipped with a
    /// warning rather than aborting the backup.
    pub fn scan(&self) -> Result<Vec<u64>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| ChrootctlError::io(self.dir.to_string(), e))?;

        let mut indexes = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ChrootctlError::io(self.dir.to_string(), e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!("skipping non-UTF-8 entry in backup folder {}", self.dir);
                continue;
            };
            let is_dir = entry
                .file_type()
                .map_err(|e| ChrootctlError::io(format!("{}/{}", self.dir, name), e))?
                .is_dir();
            match name.parse::<u64>() {
                Ok(index) if is_dir => indexes.push(index),
                _ => warn!("skipping stray entry {} in backup folder {}", name, self.dir),
            }
        }
        indexes.sort_unstable();
        Ok(indexes)
    }

    /// The index the next snapshot will be written under: one past the
    /// highest existing index, or 0 for an empty set.
    pub fn next_index(existing: &[u64]) -> u64 {
        existing.iter().max().map_or(0, |max| max + 1)
    }

    /// Deletes snapshots beyond the retention count, oldest last to go
    /// first: the removal order is by index descending among the victims.
    ///
    /// `existing` is the index list from before the newest snapshot was
    /// created; together with the new one, `keep` snapshots survive.
    /// Returns the removed paths in removal order.
    pub fn prune(&self, existing: &[u64], keep: usize) -> Result<Vec<Utf8PathBuf>> {
        let mut victims: Vec<u64> = existing.to_vec();
        victims.sort_unstable_by(|a, b| b.cmp(a));

        let mut removed = Vec::new();
        for index in victims.into_iter().skip(keep.saturating_sub(1)) {
            let path = self.path_for(index);
            fs::remove_dir_all(&path).map_err(|e| ChrootctlError::io(path.to_string(), e))?;
            removed.push(path);
        }
        Ok(removed)
    }
}

/// Builds the rsync command for one snapshot.
///
/// The source is the chroot root with a trailing slash so its contents,
/// not the directory itself, land in the destination.
fn sync_command(root: &Utf8Path, destination: &Utf8Path, link_dest: Option<&Utf8Path>) -> Command {
    let mut argv = vec!["rsync".to_string()];
    argv.extend(SYNC_FLAGS.iter().map(ToString::to_string));
    argv.extend(SYNC_EXCLUDES.iter().map(|pattern| format!("--exclude={}", pattern)));
    if let Some(previous) = link_dest {
        argv.push(format!("--link-dest={}", previous));
    }
    argv.push(format!("{}/", root));
    argv.push(destination.to_string());
    Command::new(argv)
}

/// Creates a new snapshot of `root` in `folder` and prunes old snapshots
/// down to `keep`.
///
/// Returns the new snapshot's path. A failed synchronization surfaces with
/// rsync's captured output and leaves the existing snapshots untouched.
pub fn backup(
    root: &Utf8Path,
    folder: &Utf8Path,
    keep: usize,
    executor: &dyn CommandExecutor,
) -> Result<Utf8PathBuf> {
    let set = BackupSet::new(folder);
    let existing = set.scan()?;

    let destination = set.path_for(BackupSet::next_index(&existing));
    let link_dest = existing.iter().max().map(|max| set.path_for(*max));

    let command = sync_command(root, &destination, link_dest.as_deref());
    run_till_success(executor, &[command])?;
    info!("backup at {}", destination);

    for path in set.prune(&existing, keep)? {
        info!("removed backup {}", path);
    }

    Ok(destination)
}
