//! Application configuration.
//!
//! The configuration is loaded from a JSON file, by default
//! `$XDG_CONFIG_HOME/hyprmon/config.json`, or from the path given with
//! `--config <path>`.  Every command-line flag has a counterpart here so a
//! hot-swap service can run without arguments.
//!
//! # Example
//!
//! ```json
//! {
//!   "paths": {
//!     "hyprland_config": "~/.config/hypr/hyprland.conf",
//!     "waybar_config": "~/.config/waybar/config",
//!     "temp_dir": "/tmp"
//!   },
//!   "watch": { "interval_ms": 2000 },
//!   "layout": {
//!     "left": ["DP-1", "1920x1080", "60", "0x0", "1"],
//!     "center": ["DP-2", "2560x1440", "144", "1920x0", "1"],
//!     "builtin": ["eDP-1", "1920x1200", "60", "4480x0", "1"],
//!     "secondary_monitor": "l",
//!     "disable_builtin_when_external": true
//!   }
//! }
//! ```

use crate::layout::SecondarySide;
use crate::monitor::Slot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional; a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Locations of the files that are read and rewritten.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Hot-swap polling settings.
    #[serde(default)]
    pub watch: WatchConfig,

    /// Monitor declarations and layout policy.
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// File locations.  A leading `~/` is expanded to `$HOME`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub hyprland_config: PathBuf,
    pub waybar_config: PathBuf,
    /// Where a dry run writes the generated files.
    pub temp_dir: PathBuf,
    /// Sysfs directory holding the DRM connectors.
    pub drm_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let config = xdg_config_home();
        Self {
            hyprland_config: config.join("hypr").join("hyprland.conf"),
            waybar_config: config.join("waybar").join("config"),
            temp_dir: std::env::temp_dir(),
            drm_dir: PathBuf::from(crate::drm::probe::DEFAULT_DRM_DIR),
        }
    }
}

impl PathsConfig {
    /// Copy of `self` with `~/` expanded in every path.
    pub fn expanded(&self) -> Self {
        Self {
            hyprland_config: expand_home(&self.hyprland_config),
            waybar_config: expand_home(&self.waybar_config),
            temp_dir: expand_home(&self.temp_dir),
            drm_dir: expand_home(&self.drm_dir),
        }
    }
}

/// Hot-swap polling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Time between two connection probes (ms).
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_ms: 2000 }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// One monitor declaration: name, resolution, refresh rate, position and
/// scale, exactly as they would be passed on the command line.
pub type MonitorDecl = [String; 5];

/// Monitor declarations and layout policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub left: Option<MonitorDecl>,
    pub center: Option<MonitorDecl>,
    pub right: Option<MonitorDecl>,
    pub builtin: Option<MonitorDecl>,
    pub secondary_monitor: Option<SecondarySide>,
    pub disable_builtin_when_external: bool,
}

impl LayoutConfig {
    /// The declaration for `slot`, if any.
    pub fn monitor(&self, slot: Slot) -> Option<&MonitorDecl> {
        match slot {
            Slot::Left => self.left.as_ref(),
            Slot::Center => self.center.as_ref(),
            Slot::Right => self.right.as_ref(),
            Slot::Builtin => self.builtin.as_ref(),
        }
    }

    /// Replace the declaration for `slot`.
    pub fn set_monitor(&mut self, slot: Slot, decl: MonitorDecl) {
        let field = match slot {
            Slot::Left => &mut self.left,
            Slot::Center => &mut self.center,
            Slot::Right => &mut self.right,
            Slot::Builtin => &mut self.builtin,
        };
        *field = Some(decl);
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

/// `$XDG_CONFIG_HOME`, falling back to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir().join(".config"),
    }
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    xdg_config_home().join("hyprmon").join("config.json")
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".into()))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
