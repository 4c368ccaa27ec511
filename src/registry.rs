//! The monitor registry.
//!
//! [`MonitorRegistry`] is the sole owner of the declared [`Monitor`]s.  Up to
//! four slots may be filled; an empty slot is treated as permanently
//! disconnected.  Connection state is overwritten by the probe, while
//! `disabled` and `effective_position` are written by the
//! [resolver](crate::layout::resolve).

use crate::error::LayoutError;
use crate::monitor::{Monitor, MonitorSpec, Slot, SpecViolation};
use log::debug;
use std::collections::BTreeMap;

/// Connection state of each probed slot, as reported by a
/// [`ConnectionProbe`](crate::traits::ConnectionProbe).
pub type Snapshot = BTreeMap<Slot, bool>;

/// Declared monitors keyed by slot.
#[derive(Debug, Clone, Default)]
pub struct MonitorRegistry {
    monitors: BTreeMap<Slot, Monitor>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a raw declaration and store it under `slot`.
    ///
    /// Re-registering a slot replaces the previous monitor.  A connector name
    /// may only be bound to one slot.
    pub fn register(
        &mut self,
        slot: Slot,
        name: &str,
        resolution: &str,
        refresh_rate: &str,
        base_position: &str,
        scale: &str,
    ) -> Result<&Monitor, LayoutError> {
        let spec = MonitorSpec::parse(name, resolution, refresh_rate, base_position, scale)
            .map_err(|violations| LayoutError::InvalidMonitorSpec {
                slot,
                name: name.to_string(),
                violations,
            })?;

        if let Some((other, _)) = self
            .monitors
            .iter()
            .find(|(s, m)| **s != slot && m.name() == name)
        {
            return Err(LayoutError::InvalidMonitorSpec {
                slot,
                name: name.to_string(),
                violations: vec![SpecViolation::DuplicateName(*other)],
            });
        }

        debug!("registered {} monitor {}", slot, name);
        self.monitors.insert(slot, Monitor::new(spec));
        Ok(&self.monitors[&slot])
    }

    /// Look up the monitor in `slot`.
    pub fn get(&self, slot: Slot) -> Option<&Monitor> {
        self.monitors.get(&slot)
    }

    pub(crate) fn get_mut(&mut self, slot: Slot) -> Option<&mut Monitor> {
        self.monitors.get_mut(&slot)
    }

    /// Whether a monitor is declared for `slot`.
    pub fn contains(&self, slot: Slot) -> bool {
        self.monitors.contains_key(&slot)
    }

    /// Iterate over declared monitors in slot order.
    pub fn monitors(&self) -> impl Iterator<Item = (Slot, &Monitor)> {
        self.monitors.iter().map(|(s, m)| (*s, m))
    }

    /// Connector names of every declared monitor, in slot order.
    pub fn names(&self) -> Vec<&str> {
        self.monitors.values().map(|m| m.name()).collect()
    }

    /// Whether at least one external slot is declared.
    pub fn has_external(&self) -> bool {
        self.monitors.keys().any(|s| s.is_external())
    }

    /// Whether `slot` is declared and currently connected.
    pub fn is_connected(&self, slot: Slot) -> bool {
        self.monitors.get(&slot).is_some_and(|m| m.connected)
    }

    pub fn set_connected(&mut self, slot: Slot, connected: bool) -> Result<(), LayoutError> {
        let monitor = self
            .monitors
            .get_mut(&slot)
            .ok_or(LayoutError::UnknownSlot(slot))?;
        monitor.connected = connected;
        Ok(())
    }

    pub fn set_disabled(&mut self, slot: Slot, disabled: bool) -> Result<(), LayoutError> {
        let monitor = self
            .monitors
            .get_mut(&slot)
            .ok_or(LayoutError::UnknownSlot(slot))?;
        monitor.disabled = disabled;
        Ok(())
    }

    /// Connected slots in the fixed order left, center, right, builtin.
    pub fn connected_slots(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|s| self.is_connected(*s))
            .collect()
    }

    /// Overwrite the connection state of every declared slot from a probe
    /// snapshot.  Declared slots missing from the snapshot become
    /// disconnected.
    ///
    /// Nothing is applied if the snapshot reports an undeclared slot as
    /// connected.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), LayoutError> {
        if let Some((slot, _)) = snapshot
            .iter()
            .find(|(slot, connected)| **connected && !self.contains(**slot))
        {
            return Err(LayoutError::IncompleteLayout {
                slot: *slot,
                reason: "probe reported a connection for an undeclared slot".into(),
            });
        }

        for (slot, monitor) in self.monitors.iter_mut() {
            monitor.connected = snapshot.get(slot).copied().unwrap_or(false);
        }
        Ok(())
    }

    /// Current connection state of every declared slot.
    pub fn snapshot(&self) -> Snapshot {
        self.monitors
            .iter()
            .map(|(s, m)| (*s, m.connected))
            .collect()
    }
}
