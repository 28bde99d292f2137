//! Full chroot export as a compressed tar archive.
//!
//! The archive is produced by `tar` running inside the chroot with its
//! stdout streamed straight into the dump file, so no intermediate copy of
//! the archive exists on disk.

use std::fs::{self, File};

use anyhow::Result;
use camino::Utf8Path;
use rustix::fs::{self as rfs, CWD, Mode, OFlags};
use tracing::info;

use crate::command::Command;
use crate::error::ChrootctlError;
use crate::executor::CommandExecutor;

/// Opens the dump file for writing, refusing to clobber an existing file
/// or follow a symlink at the destination.
fn create_dump_file(path: &Utf8Path) -> Result<File> {
    let fd = rfs::openat(
        CWD,
        path.as_str(),
        OFlags::CREATE | OFlags::EXCL | OFlags::WRONLY | OFlags::NOFOLLOW | OFlags::CLOEXEC,
        Mode::from_raw_mode(0o644),
    )
    .map_err(|e| match e {
        rustix::io::Errno::EXIST => {
            ChrootctlError::Validation(format!("{} already exists", path))
        }
        _ => ChrootctlError::io(
            format!("failed to create dump file {}", path),
            std::io::Error::from(e),
        ),
    })?;
    Ok(File::from(fd))
}

/// Archives the whole chroot into `dump_file`.
///
/// On failure the partial dump file is removed best-effort and tar's
/// captured stderr surfaces with the error.
pub fn dump(root: &Utf8Path, dump_file: &Utf8Path, executor: &dyn CommandExecutor) -> Result<()> {
    let file = create_dump_file(dump_file)?;

    let command = Command::from_tokens(["tar", "-czf", "-", "/"]).in_chroot(root);
    info!("dumping {} to {}", root, dump_file);

    let outcome = match executor.execute_to_file(&command, file) {
        Ok(result) if result.success() => Ok(()),
        Ok(result) => Err(ChrootctlError::execution(&command, &result).into()),
        Err(e) => Err(e),
    };

    if outcome.is_err()
        && let Err(e) = fs::remove_file(dump_file)
    {
        tracing::debug!("failed to remove partial dump file {}: {}", dump_file, e);
    }

    outcome
}
