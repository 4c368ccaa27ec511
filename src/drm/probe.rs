//! [`ConnectionProbe`] implementation backed by sysfs.
//!
//! Every display connector the kernel knows about has a directory
//! `/sys/class/drm/card<N>-<connector>` containing a `status` file whose
//! content is `connected`, `disconnected` or `unknown`.  Reading those files
//! is cheap and needs no privileges, so the probe is simply re-run on every
//! poll.

use crate::traits::ConnectionProbe;
use log::{debug, warn};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Default sysfs directory holding the DRM connectors.
pub const DEFAULT_DRM_DIR: &str = "/sys/class/drm";

const STATUS_FILE: &str = "status";
const CONNECTED_STATUS: &str = "connected";

/// Sysfs-backed connection probe.
#[derive(Debug, Clone)]
pub struct DrmProbe {
    drm_dir: PathBuf,
}

/// Errors that can occur while reading connector state.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("cannot list {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot read {}: {source}", .path.display())]
    ReadStatus {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid connector name: {0}")]
    Pattern(#[from] regex::Error),
}

impl Default for DrmProbe {
    fn default() -> Self {
        Self::new(DEFAULT_DRM_DIR)
    }
}

impl DrmProbe {
    /// Create a probe that looks for connectors below `drm_dir`.
    pub fn new(drm_dir: impl AsRef<Path>) -> Self {
        Self {
            drm_dir: drm_dir.as_ref().to_path_buf(),
        }
    }

    /// Directories below `drm_dir` that belong to `connector`.
    ///
    /// The match is exact (`card1-DP-1` never matches `card1-eDP-1`), so
    /// builtin panels whose names contain an external connector's name are
    /// not confused with it.
    fn connector_dirs(&self, connector: &str) -> Result<Vec<PathBuf>, ProbeError> {
        let pattern = Regex::new(&format!(r"^card[0-9]+-{}$", regex::escape(connector)))?;

        let entries = std::fs::read_dir(&self.drm_dir).map_err(|source| ProbeError::ListDir {
            path: self.drm_dir.clone(),
            source,
        })?;

        let mut dirs: Vec<PathBuf> = entries
            .flatten()
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|name| pattern.is_match(name))
            })
            .map(|e| e.path())
            .collect();
        dirs.sort();
        Ok(dirs)
    }
}

impl ConnectionProbe for DrmProbe {
    type Error = ProbeError;

    fn is_connected(&self, connector: &str) -> Result<bool, Self::Error> {
        let dirs = self.connector_dirs(connector)?;
        if dirs.is_empty() {
            warn!("no DRM connector found for {}", connector);
            return Ok(false);
        }

        for dir in dirs {
            let path = dir.join(STATUS_FILE);
            let status = std::fs::read_to_string(&path)
                .map_err(|source| ProbeError::ReadStatus { path: path.clone(), source })?;
            debug!("{} -> {}", path.display(), status.trim());
            if status.trim() == CONNECTED_STATUS {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Monotonic counter to generate unique directories per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    /// Helper: build a fake `/sys/class/drm` tree.
    fn fake_drm(connectors: &[(&str, &str)]) -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "hyprmon-drm-test-{}-{}",
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        // Non-connector entries that must be ignored.
        std::fs::create_dir_all(dir.join("card1")).unwrap();
        std::fs::write(dir.join("version"), "drm 1.1.0\n").unwrap();
        for (name, status) in connectors {
            let conn = dir.join(name);
            std::fs::create_dir_all(&conn).unwrap();
            std::fs::write(conn.join(STATUS_FILE), format!("{}\n", status)).unwrap();
        }
        dir
    }

    #[test]
    fn reads_connected_status() {
        let dir = fake_drm(&[("card1-DP-1", "connected"), ("card1-DP-2", "disconnected")]);
        let probe = DrmProbe::new(&dir);
        assert!(probe.is_connected("DP-1").unwrap());
        assert!(!probe.is_connected("DP-2").unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn builtin_name_does_not_shadow_external() {
        let dir = fake_drm(&[("card1-eDP-1", "connected"), ("card1-DP-1", "disconnected")]);
        let probe = DrmProbe::new(&dir);
        assert!(probe.is_connected("eDP-1").unwrap());
        assert!(!probe.is_connected("DP-1").unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_connector_is_disconnected() {
        let dir = fake_drm(&[("card0-HDMI-A-1", "connected")]);
        let probe = DrmProbe::new(&dir);
        assert!(!probe.is_connected("DP-3").unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn any_card_reporting_connected_counts() {
        let dir = fake_drm(&[("card0-DP-1", "disconnected"), ("card1-DP-1", "connected")]);
        let probe = DrmProbe::new(&dir);
        assert!(probe.is_connected("DP-1").unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_status_is_disconnected() {
        let dir = fake_drm(&[("card1-DP-1", "unknown")]);
        let probe = DrmProbe::new(&dir);
        assert!(!probe.is_connected("DP-1").unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_drm_dir_is_an_error() {
        let probe = DrmProbe::new("/nonexistent/hyprmon/drm");
        assert!(matches!(
            probe.is_connected("DP-1"),
            Err(ProbeError::ListDir { .. })
        ));
    }
}
