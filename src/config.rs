//! Per-chroot service hook configuration.
//!
//! Each chroot may have a JSON sidecar file named `<root>.json` describing
//! the commands to run when services inside it are started or stopped:
//!
//! ```json
//! {
//!   "start": [["service", "nginx", "start"]],
//!   "stop": [["service", "nginx", "stop"]]
//! }
//! ```
//!
//! Both keys are optional and default to empty lists; a missing sidecar file
//! is equivalent to an empty configuration. The file is re-read on every
//! access, so external edits take effect on the next lifecycle call.

use std::fs;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::error::ChrootctlError;

/// Service hook configuration loaded from the sidecar file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Commands run, fail-fast, when the chroot's services are started.
    #[serde(default)]
    pub start: Vec<Vec<String>>,
    /// Commands run, best-effort, when the chroot's services are stopped.
    #[serde(default)]
    pub stop: Vec<Vec<String>>,
}

/// The sidecar configuration path for a chroot root: `<root>.json`.
pub fn sidecar_path(root: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}.json", root))
}

/// Loads the sidecar configuration for `root`.
///
/// An absent sidecar (or a sidecar that is not a regular file) yields the
/// empty default; malformed JSON is a configuration error.
pub fn load(root: &Utf8Path) -> Result<ServiceConfig> {
    let path = sidecar_path(root);
    if !path.is_file() {
        return Ok(ServiceConfig::default());
    }

    let data = fs::read(&path).map_err(|e| ChrootctlError::io(path.to_string(), e))?;
    serde_json::from_slice(&data)
        .map_err(|e| ChrootctlError::Config(format!("{}: {}", path, e)).into())
}
