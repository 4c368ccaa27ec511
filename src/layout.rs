//! The layout resolver.
//!
//! [`resolve`] turns the registry's connection state into a [`LayoutPlan`]:
//! which outputs are on, where they sit, which monitor the status bar uses
//! and which monitor each of the workspaces 1–11 is bound to.
//!
//! The three external connection flags are classified once into a
//! [`Connectivity`] state and every decision below is an exhaustive `match`
//! over that state and the [`SecondarySide`] preference.
//!
//! # Position reassignment
//!
//! Each declared base position describes the layout with every monitor
//! connected.  When externals are missing the remaining monitors take over
//! the *declared* positions of their neighbours (values are copied, never
//! computed):
//!
//! | State         | builtin     | right       | center    |
//! |---------------|-------------|-------------|-----------|
//! | `AllThree`    | unchanged   | unchanged   | unchanged |
//! | `CenterRight` | right.base  | center.base | left.base |
//! | `LeftRight`   | right.base  | center.base | –         |
//! | `LeftCenter`  | right.base  | –           | unchanged |
//! | `LeftOnly`    | center.base | –           | –         |
//! | `CenterOnly`  | center.base | –           | left.base |
//! | `RightOnly`   | center.base | left.base   | –         |
//! | `NoExternal`  | left.base   | –           | –         |
//!
//! The left monitor never moves.

use crate::error::LayoutError;
use crate::monitor::{Position, Resolution, Slot};
use crate::registry::MonitorRegistry;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Highest workspace number the resolver assigns.
pub const LAST_WORKSPACE: u8 = 11;

/// Which side the secondary monitor goes to when exactly two externals are
/// connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecondarySide {
    #[serde(rename = "l", alias = "left")]
    Left,
    #[serde(rename = "r", alias = "right")]
    Right,
}

impl FromStr for SecondarySide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "l" | "left" => Ok(SecondarySide::Left),
            "r" | "right" => Ok(SecondarySide::Right),
            other => Err(format!("invalid secondary monitor side: {:?} (expected l or r)", other)),
        }
    }
}

/// Fixed policy inputs of a resolver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub secondary: SecondarySide,
    /// Turn the builtin panel off whenever an external monitor is connected.
    pub disable_builtin_when_external: bool,
}

/// Which of the left / center / right monitors are connected.
///
/// The builtin monitor does not take part in the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connectivity {
    AllThree,
    LeftCenter,
    LeftRight,
    CenterRight,
    LeftOnly,
    CenterOnly,
    RightOnly,
    NoExternal,
}

impl Connectivity {
    /// Classify a `(left, center, right)` triple.
    pub fn classify(left: bool, center: bool, right: bool) -> Self {
        match (left, center, right) {
            (true, true, true) => Connectivity::AllThree,
            (true, true, false) => Connectivity::LeftCenter,
            (true, false, true) => Connectivity::LeftRight,
            (false, true, true) => Connectivity::CenterRight,
            (true, false, false) => Connectivity::LeftOnly,
            (false, true, false) => Connectivity::CenterOnly,
            (false, false, true) => Connectivity::RightOnly,
            (false, false, false) => Connectivity::NoExternal,
        }
    }

    /// Classify the registry's current connection state.  Undeclared slots
    /// count as disconnected.
    pub fn of(registry: &MonitorRegistry) -> Self {
        Self::classify(
            registry.is_connected(Slot::Left),
            registry.is_connected(Slot::Center),
            registry.is_connected(Slot::Right),
        )
    }

    /// Number of connected external monitors.
    pub fn external_count(self) -> usize {
        match self {
            Connectivity::AllThree => 3,
            Connectivity::LeftCenter | Connectivity::LeftRight | Connectivity::CenterRight => 2,
            Connectivity::LeftOnly | Connectivity::CenterOnly | Connectivity::RightOnly => 1,
            Connectivity::NoExternal => 0,
        }
    }

    pub fn any_external(self) -> bool {
        self != Connectivity::NoExternal
    }

    /// `(target, source)` pairs: `target` takes over `source`'s declared
    /// base position.
    fn position_moves(self) -> &'static [(Slot, Slot)] {
        match self {
            Connectivity::AllThree => &[],
            Connectivity::CenterRight => &[
                (Slot::Builtin, Slot::Right),
                (Slot::Right, Slot::Center),
                (Slot::Center, Slot::Left),
            ],
            Connectivity::LeftRight => &[(Slot::Builtin, Slot::Right), (Slot::Right, Slot::Center)],
            Connectivity::LeftCenter => &[(Slot::Builtin, Slot::Right)],
            Connectivity::LeftOnly => &[(Slot::Builtin, Slot::Center)],
            Connectivity::CenterOnly => &[(Slot::Builtin, Slot::Center), (Slot::Center, Slot::Left)],
            Connectivity::RightOnly => &[(Slot::Builtin, Slot::Center), (Slot::Right, Slot::Left)],
            Connectivity::NoExternal => &[(Slot::Builtin, Slot::Left)],
        }
    }

    /// Monitor the status bar is rendered on.
    pub fn status_bar(self, side: SecondarySide) -> Slot {
        use Connectivity as C;
        use SecondarySide as S;
        match (self, side) {
            (C::AllThree, _) => Slot::Center,
            (C::CenterRight, S::Left) => Slot::Right,
            (C::CenterRight, S::Right) => Slot::Center,
            (C::LeftRight, S::Left) => Slot::Right,
            (C::LeftRight, S::Right) => Slot::Left,
            (C::LeftCenter, S::Left) => Slot::Center,
            (C::LeftCenter, S::Right) => Slot::Left,
            (C::LeftOnly, _) => Slot::Left,
            (C::CenterOnly, _) => Slot::Center,
            (C::RightOnly, _) => Slot::Right,
            (C::NoExternal, _) => Slot::Builtin,
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::AllThree => write!(f, "all external monitors connected"),
            Connectivity::LeftCenter => write!(f, "right monitor not connected"),
            Connectivity::LeftRight => write!(f, "center monitor not connected"),
            Connectivity::CenterRight => write!(f, "left monitor not connected"),
            Connectivity::LeftOnly => write!(f, "center and right monitors not connected"),
            Connectivity::CenterOnly => write!(f, "left and right monitors not connected"),
            Connectivity::RightOnly => write!(f, "left and center monitors not connected"),
            Connectivity::NoExternal => write!(f, "no external monitors connected"),
        }
    }
}

/// The groups of workspaces that share one target rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceRange {
    /// Workspaces 1–5.  Workspace 1 is always a default workspace.
    Primary,
    /// Workspaces 6–7.
    Secondary,
    /// Workspaces 8–10.
    Tertiary,
    /// Workspace 11, which only toggles its default marker.
    Spare,
}

impl WorkspaceRange {
    pub fn of(workspace: u8) -> Option<Self> {
        match workspace {
            1..=5 => Some(WorkspaceRange::Primary),
            6..=7 => Some(WorkspaceRange::Secondary),
            8..=10 => Some(WorkspaceRange::Tertiary),
            11 => Some(WorkspaceRange::Spare),
            _ => None,
        }
    }

    /// The workspace that may carry the default marker.
    pub fn first(self) -> u8 {
        match self {
            WorkspaceRange::Primary => 1,
            WorkspaceRange::Secondary => 6,
            WorkspaceRange::Tertiary => 8,
            WorkspaceRange::Spare => 11,
        }
    }

    /// Monitor the range is bound to, or `None` for the spare workspace.
    pub fn target(self, state: Connectivity, side: SecondarySide) -> Option<Slot> {
        use Connectivity as C;
        use SecondarySide as S;
        let slot = match self {
            WorkspaceRange::Primary => match (state, side) {
                (C::AllThree, _)
                | (C::LeftCenter, S::Left)
                | (C::CenterRight, S::Right)
                | (C::CenterOnly, _) => Slot::Center,
                (C::LeftCenter | C::LeftRight, S::Right) | (C::LeftOnly, _) => Slot::Left,
                (C::CenterRight | C::LeftRight, S::Left) | (C::RightOnly, _) => Slot::Right,
                (C::NoExternal, _) => Slot::Builtin,
            },
            WorkspaceRange::Secondary => match (state, side) {
                (C::AllThree | C::LeftOnly, _) => Slot::Left,
                (C::LeftCenter, S::Left) | (C::CenterRight, S::Right) | (C::CenterOnly, _) => {
                    Slot::Center
                }
                (C::LeftRight | C::CenterRight, S::Left) | (C::RightOnly, _) => Slot::Right,
                (C::LeftRight | C::LeftCenter, S::Right) => Slot::Left,
                (C::NoExternal, _) => Slot::Builtin,
            },
            WorkspaceRange::Tertiary => match (state, side) {
                (C::AllThree, _) | (C::LeftRight | C::CenterRight, S::Right) | (C::RightOnly, _) => {
                    Slot::Right
                }
                (C::LeftRight | C::LeftCenter, S::Left) | (C::LeftOnly, _) => Slot::Left,
                (C::LeftCenter, S::Right) | (C::CenterRight, S::Left) | (C::CenterOnly, _) => {
                    Slot::Center
                }
                (C::NoExternal, _) => Slot::Builtin,
            },
            WorkspaceRange::Spare => return None,
        };
        Some(slot)
    }

    /// Whether the range's first workspace is marked as a default workspace.
    pub fn first_is_default(self, state: Connectivity) -> bool {
        match self {
            WorkspaceRange::Primary => true,
            WorkspaceRange::Secondary => state == Connectivity::AllThree,
            WorkspaceRange::Tertiary => state.external_count() >= 2,
            WorkspaceRange::Spare => state.any_external(),
        }
    }
}

/// How a monitor's output line is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputState {
    /// Connected and configured.
    Enabled,
    /// Not connected.  Emitted in enabled form but commented out, so a
    /// reconnect only toggles the prefix.
    Inactive,
    /// Forced off.
    Disabled,
}

/// Resolved configuration of one declared monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorPlan {
    pub name: String,
    pub resolution: Resolution,
    pub refresh_rate: u32,
    pub effective_position: Position,
    pub scale: u8,
    pub connected: bool,
    pub disabled: bool,
    pub state: OutputState,
}

/// Resolved binding of one workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceAssignment {
    /// Monitor to bind to; `None` keeps whatever monitor the line names.
    pub target: Option<Slot>,
    pub is_default: bool,
}

/// Complete output of one resolver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub connectivity: Connectivity,
    pub monitors: BTreeMap<Slot, MonitorPlan>,
    pub status_bar: Slot,
    pub workspaces: BTreeMap<u8, WorkspaceAssignment>,
}

impl LayoutPlan {
    pub fn monitor(&self, slot: Slot) -> Option<&MonitorPlan> {
        self.monitors.get(&slot)
    }

    pub fn workspace(&self, workspace: u8) -> Option<&WorkspaceAssignment> {
        self.workspaces.get(&workspace)
    }

    /// Connector name of the monitor the status bar renders on.
    pub fn status_bar_name(&self) -> Option<&str> {
        self.monitor(self.status_bar).map(|m| m.name.as_str())
    }

    /// Connector name `workspace` is bound to, if it is rebound at all.
    pub fn target_name(&self, workspace: u8) -> Option<&str> {
        let slot = self.workspace(workspace)?.target?;
        self.monitor(slot).map(|m| m.name.as_str())
    }

    /// Connector names of every declared monitor.
    pub fn monitor_names(&self) -> Vec<&str> {
        self.monitors.values().map(|m| m.name.as_str()).collect()
    }
}

/// Compute the layout for the registry's current connection state.
///
/// On success the registry's `effective_position` and `disabled` fields are
/// updated to match the plan.  On error the registry is left untouched.
pub fn resolve(
    registry: &mut MonitorRegistry,
    options: &ResolveOptions,
) -> Result<LayoutPlan, LayoutError> {
    let builtin = registry
        .get(Slot::Builtin)
        .ok_or_else(|| LayoutError::IncompleteLayout {
            slot: Slot::Builtin,
            reason: "a builtin monitor must be declared".into(),
        })?;

    let connectivity = Connectivity::of(registry);
    debug!("{}", connectivity);

    // Sticky: once off, the builtin stays off until the caller re-enables it.
    let builtin_disabled =
        builtin.disabled || (options.disable_builtin_when_external && connectivity.any_external());

    let is_disabled = |slot: Slot| -> bool {
        match slot {
            Slot::Builtin => builtin_disabled,
            _ => registry.get(slot).is_some_and(|m| m.disabled),
        }
    };

    let mut positions: BTreeMap<Slot, Position> = registry
        .monitors()
        .map(|(slot, m)| (slot, m.spec.base_position))
        .collect();

    for &(target, source) in connectivity.position_moves() {
        let Some(target_monitor) = registry.get(target) else {
            continue;
        };
        let position = match registry.get(source) {
            Some(m) => m.spec.base_position,
            // A disabled output is emitted without a position, and with no
            // external declared at all the builtin simply stays put.
            None if is_disabled(target) || !registry.has_external() => {
                target_monitor.spec.base_position
            }
            None => {
                return Err(LayoutError::IncompleteLayout {
                    slot: source,
                    reason: format!(
                        "the {} monitor takes over the {} monitor's position, but no {} monitor is declared",
                        target, source, source
                    ),
                })
            }
        };
        positions.insert(target, position);
    }

    let monitors: BTreeMap<Slot, MonitorPlan> = registry
        .monitors()
        .map(|(slot, m)| {
            let disabled = is_disabled(slot);
            let state = if disabled {
                OutputState::Disabled
            } else if m.connected {
                OutputState::Enabled
            } else {
                OutputState::Inactive
            };
            let plan = MonitorPlan {
                name: m.spec.name.clone(),
                resolution: m.spec.resolution,
                refresh_rate: m.spec.refresh_rate,
                effective_position: positions[&slot],
                scale: m.spec.scale,
                connected: m.connected,
                disabled,
                state,
            };
            (slot, plan)
        })
        .collect();

    let workspaces = (1..=LAST_WORKSPACE)
        .filter_map(|ws| {
            let range = WorkspaceRange::of(ws)?;
            let assignment = WorkspaceAssignment {
                target: range.target(connectivity, options.secondary),
                is_default: ws == range.first() && range.first_is_default(connectivity),
            };
            Some((ws, assignment))
        })
        .collect();

    let plan = LayoutPlan {
        connectivity,
        monitors,
        status_bar: connectivity.status_bar(options.secondary),
        workspaces,
    };

    for (slot, monitor_plan) in &plan.monitors {
        if let Some(m) = registry.get_mut(*slot) {
            m.effective_position = monitor_plan.effective_position;
            m.disabled = monitor_plan.disabled;
        }
    }

    Ok(plan)
}
