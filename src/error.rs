//! Errors raised by the registry and the layout resolver.
//!
//! All of them are caller-recoverable: nothing is partially applied, so
//! fixing the input and retrying is always safe.

use crate::monitor::{Slot, SpecViolation};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// One or more declared fields failed validation.
    #[error("invalid {slot} monitor {name}: {}", join_violations(.violations))]
    InvalidMonitorSpec {
        slot: Slot,
        name: String,
        violations: Vec<SpecViolation>,
    },

    /// A mutation addressed a slot that was never declared.
    #[error("no monitor declared for the {0} slot")]
    UnknownSlot(Slot),

    /// The layout cannot be computed from what is declared.
    #[error("incomplete layout ({slot} slot): {reason}")]
    IncompleteLayout { slot: Slot, reason: String },
}

fn join_violations(violations: &[SpecViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_spec_message_lists_every_field() {
        let err = LayoutError::InvalidMonitorSpec {
            slot: Slot::Left,
            name: "DP-1".into(),
            violations: vec![
                SpecViolation::RefreshRate("6".into()),
                SpecViolation::Scale("10".into()),
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("invalid left monitor DP-1: "));
        assert!(msg.contains("refresh rate \"6\""));
        assert!(msg.contains("scale \"10\""));
    }
}
