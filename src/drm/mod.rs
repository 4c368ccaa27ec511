//! Linux DRM-specific implementations.
//!
//! This module provides the concrete
//! [`ConnectionProbe`](crate::traits::ConnectionProbe) backend, powered by
//! the kernel's connector status files under `/sys/class/drm`.
//!
//! Nothing outside this module should reference sysfs directly.

pub mod probe;

pub use probe::{DrmProbe, ProbeError};
