//! Axis rescaling from source calibration to destination calibration.
//!
//! A raw value is first turned into a physical offset from the centre of
//! the source range (`(value - centre) / resolution`, in millimetres), then
//! projected into destination units around the centre of the destination
//! range and clamped to it. Devices with different ranges and different
//! resolutions thus agree on physical distance from the centre.
//!
//! The final value is truncated toward zero, not rounded. This biases each
//! event by less than one destination unit toward zero and is accepted
//! behaviour.

use touchpad_relay_types::{AxisCalibration, CalibrationError, MappedAxis};

/// Rescaling for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisTransform {
    source: AxisCalibration,
    dest: AxisCalibration,
}

/// Which side of a transform failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
        }
    }
}

impl AxisTransform {
    /// Build a transform, rejecting calibrations that would divide by zero
    /// or have an inverted range.
    pub fn new(
        source: AxisCalibration,
        dest: AxisCalibration,
    ) -> Result<Self, (Side, CalibrationError)> {
        source.validate().map_err(|e| (Side::Source, e))?;
        dest.validate().map_err(|e| (Side::Destination, e))?;
        Ok(Self { source, dest })
    }

    /// Map a raw source value into the destination range.
    ///
    /// Values outside the source range are still projected; the result is
    /// always saturated into `[dest.minimum, dest.maximum]`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&self, value: i32) -> i32 {
        let delta = f64::from(value) - self.source.center();
        // Scale before dividing so equal calibrations map exactly.
        let projected = delta * f64::from(self.dest.resolution) / f64::from(self.source.resolution);
        let mapped = projected + self.dest.center();
        // `as` truncates toward zero and saturates at the i32 bounds.
        self.dest.clamp(mapped as i32)
    }
}

/// Per-axis transforms for the closed set of remapped axes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformTable {
    slots: [Option<AxisTransform>; 4],
}

impl TransformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, axis: MappedAxis, transform: AxisTransform) {
        self.slots[axis.index()] = Some(transform);
    }

    pub fn get(&self, axis: MappedAxis) -> Option<&AxisTransform> {
        self.slots[axis.index()].as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
