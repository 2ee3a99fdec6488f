//! Conversions between evdev types and touchpad-relay types.

use evdev::AbsInfo;
use touchpad_relay_types::{AbsAxisInfo, AxisCalibration, EventKind, RawEvent};

/// Convert an evdev `InputEvent` into a `RawEvent`.
pub(crate) fn event_from_evdev(ev: &evdev::InputEvent) -> RawEvent {
    RawEvent {
        kind: EventKind::from_raw(ev.event_type().0),
        code: ev.code(),
        value: ev.value(),
        timestamp: ev.timestamp(),
    }
}

/// Convert a `RawEvent` into an evdev `InputEvent` for writing.
///
/// The kernel stamps injected events itself, so the source timestamp is
/// not carried over.
pub(crate) fn event_to_evdev(ev: &RawEvent) -> evdev::InputEvent {
    evdev::InputEvent::new(ev.kind.as_raw(), ev.code, ev.value)
}

pub(crate) fn calibration_from_absinfo(info: &AbsInfo) -> AxisCalibration {
    AxisCalibration::new(info.minimum(), info.maximum(), info.resolution())
}

pub(crate) fn absinfo_from_axis(info: &AbsAxisInfo) -> AbsInfo {
    let cal = info.calibration;
    AbsInfo::new(
        cal.minimum,
        cal.minimum,
        cal.maximum,
        info.fuzz,
        info.flat,
        cal.resolution,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::{AbsoluteAxisCode, EventType};
    use touchpad_relay_types::event::ABS_MT_POSITION_Y;

    #[test]
    fn event_roundtrip() {
        let raw = RawEvent::absolute(ABS_MT_POSITION_Y, 1234);
        let ev = event_to_evdev(&raw);
        assert_eq!(ev.event_type(), EventType::ABSOLUTE);
        assert_eq!(ev.code(), AbsoluteAxisCode::ABS_MT_POSITION_Y.0);
        assert_eq!(ev.value(), 1234);

        let back = event_from_evdev(&ev);
        assert_eq!(back.kind, EventKind::Absolute);
        assert_eq!(back.code, ABS_MT_POSITION_Y);
        assert_eq!(back.value, 1234);
    }

    #[test]
    fn absinfo_carries_calibration() {
        let axis = AbsAxisInfo {
            calibration: AxisCalibration::new(1472, 5470, 60),
            fuzz: 8,
            flat: 0,
        };
        let info = absinfo_from_axis(&axis);
        assert_eq!(info.minimum(), 1472);
        assert_eq!(info.maximum(), 5470);
        assert_eq!(info.fuzz(), 8);
        assert_eq!(info.resolution(), 60);
        assert_eq!(calibration_from_absinfo(&info), axis.calibration);
    }
}
