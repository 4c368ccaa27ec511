//! Seams between the layout core and the outside world.
//!
//! The resolver never reads or writes files.  Connection state comes in
//! through a [`ConnectionProbe`] and the resulting plan goes out through one
//! or more [`ConfigRewriter`]s, so the
//! [`LayoutSession`](crate::session::LayoutSession) can be driven by a fake
//! sysfs tree or a scripted probe in tests.

use crate::layout::LayoutPlan;
use crate::registry::{MonitorRegistry, Snapshot};

/// Reports whether a display connector currently has a monitor attached.
///
/// An implementation might read `/sys/class/drm`, or it might be a
/// scripted stub used in tests.
pub trait ConnectionProbe {
    /// The error type produced by this probe.
    type Error: std::error::Error + Send + 'static;

    /// Whether the connector named `connector` (e.g. `"DP-1"`) is connected.
    ///
    /// Unknown connectors are reported as disconnected, not as an error.
    fn is_connected(&self, connector: &str) -> Result<bool, Self::Error>;

    /// Probe every declared monitor of `registry`.
    fn snapshot(&self, registry: &MonitorRegistry) -> Result<Snapshot, Self::Error> {
        registry
            .monitors()
            .map(|(slot, m)| Ok((slot, self.is_connected(m.name())?)))
            .collect::<Result<Snapshot, Self::Error>>()
    }
}

/// A text-to-text pass that splices a [`LayoutPlan`] into one config file.
///
/// Rewriters work line by line and copy every line they do not recognise
/// verbatim, so user edits elsewhere in the file survive.
pub trait ConfigRewriter {
    /// Short name used in log messages (e.g. `"hyprland"`).
    fn label(&self) -> &'static str;

    /// Return `contents` with the plan applied.
    fn rewrite(&self, contents: &str, plan: &LayoutPlan) -> String;
}
