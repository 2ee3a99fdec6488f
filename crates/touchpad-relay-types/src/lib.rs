//! Shared types for touchpad-relay.
//!
//! This crate contains the plain data shared across the workspace: raw
//! input events, per-axis calibration, the closed set of remapped axes,
//! and the description of a destination device read from a recording.

pub mod calibration;
pub mod device;
pub mod event;

pub use calibration::{AxisCalibration, CalibrationError};
pub use device::{AbsAxisInfo, DeviceDescription, InputId};
pub use event::{EventKind, MappedAxis, RawEvent};
