//! Description of the destination device, as captured in a recording.

use std::collections::{BTreeMap, BTreeSet};

use crate::calibration::AxisCalibration;
use crate::event::{EventKind, MappedAxis};

/// Bus/vendor/product/version quadruple (`struct input_id`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InputId {
    pub bustype: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

/// Full absinfo of one axis, minus the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsAxisInfo {
    pub calibration: AxisCalibration,
    pub fuzz: i32,
    pub flat: i32,
}

/// Everything needed to recreate a device through uinput.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescription {
    pub name: String,
    pub id: InputId,
    /// `INPUT_PROP_*` bits.
    pub properties: BTreeSet<u16>,
    /// Supported codes keyed by raw event type.
    pub codes: BTreeMap<u16, BTreeSet<u16>>,
    /// Absolute axes keyed by `ABS_*` code.
    pub axes: BTreeMap<u16, AbsAxisInfo>,
}

impl DeviceDescription {
    /// Codes supported for one event type, empty if the type is absent.
    pub fn codes_for(&self, kind: EventKind) -> impl Iterator<Item = u16> + '_ {
        self.codes
            .get(&kind.as_raw())
            .into_iter()
            .flat_map(|codes| codes.iter().copied())
    }

    #[must_use]
    pub fn calibration(&self, code: u16) -> Option<AxisCalibration> {
        self.axes.get(&code).map(|info| info.calibration)
    }

    #[must_use]
    pub fn axis_calibration(&self, axis: MappedAxis) -> Option<AxisCalibration> {
        self.calibration(axis.code())
    }
}
