//! Monitor declarations and the vocabulary shared by every component.
//!
//! A [`Monitor`] is one declared display output bound to a [`Slot`].  The
//! declared fields come from five raw strings (name, resolution, refresh
//! rate, position, scale) exactly as they are written on the command line or
//! in the config file; [`MonitorSpec::parse`] validates all of them at once
//! so the user sees every mistake in one go.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static RESOLUTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})x([0-9]{3,4})$").expect("valid regex"));
static REFRESH_RATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2,3}$").expect("valid regex"));
static POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,4})x0$").expect("valid regex"));
static SCALE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-9]$").expect("valid regex"));

/// One of the four fixed monitor roles.
///
/// `Left`, `Center` and `Right` are external monitors placed side by side;
/// `Builtin` is the laptop panel and does not take part in the side-by-side
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Left,
    Center,
    Right,
    Builtin,
}

impl Slot {
    /// Every slot, in the fixed reporting order.
    pub const ALL: [Slot; 4] = [Slot::Left, Slot::Center, Slot::Right, Slot::Builtin];

    pub fn is_external(self) -> bool {
        !matches!(self, Slot::Builtin)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Left => write!(f, "left"),
            Slot::Center => write!(f, "center"),
            Slot::Right => write!(f, "right"),
            Slot::Builtin => write!(f, "builtin"),
        }
    }
}

/// Output mode size in pixels, written `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Horizontal offset of a monitor on the virtual desktop, written `Xx0`.
///
/// Only side-by-side arrangements are supported, so the y coordinate is
/// always zero and is not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: u32,
}

impl Position {
    pub fn new(x: u32) -> Self {
        Self { x }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x0", self.x)
    }
}

/// A single field of a monitor declaration that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecViolation {
    /// Resolution is not `WWWWxHHH` or `WWWWxHHHH`.
    Resolution(String),
    /// Refresh rate is not a 2–3 digit integer.
    RefreshRate(String),
    /// Position is not `Nx0` with a 1–4 digit `N`.
    Position(String),
    /// Scale is not a single digit 1–9.
    Scale(String),
    /// The connector name is already bound to another slot.
    DuplicateName(Slot),
}

impl fmt::Display for SpecViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecViolation::Resolution(v) => {
                write!(f, "invalid resolution {:?} (expected e.g. 1920x1080)", v)
            }
            SpecViolation::RefreshRate(v) => {
                write!(f, "invalid refresh rate {:?} (expected 2-3 digits)", v)
            }
            SpecViolation::Position(v) => {
                write!(f, "invalid starting coordinate {:?} (expected e.g. 1920x0)", v)
            }
            SpecViolation::Scale(v) => write!(f, "invalid scale {:?} (expected 1-9)", v),
            SpecViolation::DuplicateName(other) => {
                write!(f, "connector already declared as the {} monitor", other)
            }
        }
    }
}

/// The validated, immutable part of a monitor declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSpec {
    /// Connector name as the kernel and Hyprland report it (e.g. `"DP-1"`).
    pub name: String,
    pub resolution: Resolution,
    pub refresh_rate: u32,
    /// Position when every declared monitor is connected.
    pub base_position: Position,
    pub scale: u8,
}

impl MonitorSpec {
    /// Validate the raw declaration fields.
    ///
    /// Returns every violation, not only the first one.
    pub fn parse(
        name: &str,
        resolution: &str,
        refresh_rate: &str,
        position: &str,
        scale: &str,
    ) -> Result<Self, Vec<SpecViolation>> {
        let mut violations = Vec::new();

        let resolution = match RESOLUTION_RE.captures(resolution) {
            Some(caps) => Some(Resolution {
                width: caps[1].parse().unwrap_or_default(),
                height: caps[2].parse().unwrap_or_default(),
            }),
            None => {
                violations.push(SpecViolation::Resolution(resolution.to_string()));
                None
            }
        };

        let refresh_rate = if REFRESH_RATE_RE.is_match(refresh_rate) {
            refresh_rate.parse::<u32>().ok()
        } else {
            violations.push(SpecViolation::RefreshRate(refresh_rate.to_string()));
            None
        };

        let base_position = match POSITION_RE.captures(position) {
            Some(caps) => caps[1].parse().ok().map(Position::new),
            None => {
                violations.push(SpecViolation::Position(position.to_string()));
                None
            }
        };

        let scale = if SCALE_RE.is_match(scale) {
            scale.parse::<u8>().ok()
        } else {
            violations.push(SpecViolation::Scale(scale.to_string()));
            None
        };

        match (resolution, refresh_rate, base_position, scale) {
            (Some(resolution), Some(refresh_rate), Some(base_position), Some(scale))
                if violations.is_empty() =>
            {
                Ok(Self {
                    name: name.to_string(),
                    resolution,
                    refresh_rate,
                    base_position,
                    scale,
                })
            }
            _ => Err(violations),
        }
    }
}

/// A declared monitor together with its live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub spec: MonitorSpec,
    /// Position after the last resolver pass.  Equals the base position
    /// until a pass runs.
    pub effective_position: Position,
    pub connected: bool,
    /// Force the monitor off regardless of its connection.
    pub disabled: bool,
}

impl Monitor {
    pub fn new(spec: MonitorSpec) -> Self {
        Self {
            effective_position: spec.base_position,
            spec,
            connected: false,
            disabled: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_spec() {
        let spec = MonitorSpec::parse("DP-1", "2560x1440", "144", "1920x0", "1").unwrap();
        assert_eq!(spec.name, "DP-1");
        assert_eq!(spec.resolution, Resolution { width: 2560, height: 1440 });
        assert_eq!(spec.refresh_rate, 144);
        assert_eq!(spec.base_position, Position::new(1920));
        assert_eq!(spec.scale, 1);
    }

    #[test]
    fn parse_four_digit_height() {
        let spec = MonitorSpec::parse("DP-2", "3840x2160", "60", "0x0", "2").unwrap();
        assert_eq!(spec.resolution.to_string(), "3840x2160");
    }

    #[test]
    fn parse_reports_every_violation() {
        let err = MonitorSpec::parse("DP-1", "1920*1080", "5", "0x10", "0").unwrap_err();
        assert_eq!(
            err,
            vec![
                SpecViolation::Resolution("1920*1080".into()),
                SpecViolation::RefreshRate("5".into()),
                SpecViolation::Position("0x10".into()),
                SpecViolation::Scale("0".into()),
            ]
        );
    }

    #[test]
    fn parse_rejects_short_width() {
        let err = MonitorSpec::parse("HDMI-A-1", "800x600", "60", "0x0", "1").unwrap_err();
        assert_eq!(err, vec![SpecViolation::Resolution("800x600".into())]);
    }

    #[test]
    fn parse_rejects_five_digit_offset() {
        let err = MonitorSpec::parse("DP-3", "1920x1080", "60", "12345x0", "1").unwrap_err();
        assert_eq!(err, vec![SpecViolation::Position("12345x0".into())]);
    }

    #[test]
    fn parse_rejects_four_digit_refresh_rate() {
        let err = MonitorSpec::parse("DP-3", "1920x1080", "1000", "0x0", "1").unwrap_err();
        assert_eq!(err, vec![SpecViolation::RefreshRate("1000".into())]);
    }

    #[test]
    fn new_monitor_starts_at_base_position() {
        let spec = MonitorSpec::parse("eDP-1", "1920x1200", "60", "3840x0", "1").unwrap();
        let m = Monitor::new(spec);
        assert_eq!(m.effective_position, Position::new(3840));
        assert!(!m.connected);
        assert!(!m.disabled);
        assert_eq!(m.name(), "eDP-1");
    }

    #[test]
    fn position_display() {
        assert_eq!(Position::new(0).to_string(), "0x0");
        assert_eq!(Position::new(2560).to_string(), "2560x0");
    }

    #[test]
    fn slot_display_and_order() {
        let names: Vec<String> = Slot::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["left", "center", "right", "builtin"]);
        assert!(Slot::Left < Slot::Builtin);
        assert!(!Slot::Builtin.is_external());
        assert!(Slot::Center.is_external());
    }
}
