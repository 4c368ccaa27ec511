//! **hyprmon**: connection-aware monitor and workspace layout for Hyprland
//! and Waybar.
//!
//! Up to three external monitors (left, center, right) and one builtin
//! laptop panel are declared with their preferred mode and their position
//! in the fully connected layout.  Whenever the set of connected monitors
//! changes, the remaining monitors slide into the freed positions,
//! workspaces 1–11 are rebound to connected monitors and the status bar is
//! moved to the primary monitor.
//!
//! # Architecture
//!
//! The decision core is pure and synchronous:
//!
//! * [`registry::MonitorRegistry`] owns the declared [`monitor::Monitor`]s
//!   and their live state.
//! * [`layout::resolve`] turns that state into a [`layout::LayoutPlan`].
//!
//! Two traits connect it to the outside world:
//!
//! * [`traits::ConnectionProbe`] reports which connectors are plugged in
//!   ([`drm::DrmProbe`] reads sysfs).
//! * [`traits::ConfigRewriter`] splices a plan into a config file
//!   ([`rewrite`] holds the Hyprland and Waybar grammars).
//!
//! [`session::LayoutSession`] wires them together for a single run or a
//! polling hot-swap loop.

pub mod config;
pub mod drm;
pub mod error;
pub mod layout;
pub mod monitor;
pub mod registry;
pub mod rewrite;
pub mod session;
pub mod traits;
