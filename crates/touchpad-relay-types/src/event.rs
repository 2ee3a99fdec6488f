//! Raw input events and the set of axes that get remapped.
//!
//! Event types and codes follow the Linux input-event taxonomy
//! (`linux/input-event-codes.h`). Only the handful of codes the relay
//! needs to recognise are named here; everything else is carried as a raw
//! number and passed through untouched.

use std::time::SystemTime;

/// `SYN_REPORT`: end of an event frame.
pub const SYN_REPORT: u16 = 0x00;
/// `SYN_DROPPED`: the kernel's event buffer overflowed.
pub const SYN_DROPPED: u16 = 0x03;

pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;
pub const ABS_PRESSURE: u16 = 0x18;
pub const ABS_MT_SLOT: u16 = 0x2f;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;
pub const ABS_MT_PRESSURE: u16 = 0x3a;

/// Event type (`EV_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Synchronization,
    Key,
    Relative,
    Absolute,
    Misc,
    Switch,
    Led,
    Sound,
    Repeat,
    ForceFeedback,
    Power,
    ForceFeedbackStatus,
    /// Any type the relay has no name for.
    Other(u16),
}

impl EventKind {
    #[must_use]
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0x00 => Self::Synchronization,
            0x01 => Self::Key,
            0x02 => Self::Relative,
            0x03 => Self::Absolute,
            0x04 => Self::Misc,
            0x05 => Self::Switch,
            0x11 => Self::Led,
            0x12 => Self::Sound,
            0x14 => Self::Repeat,
            0x15 => Self::ForceFeedback,
            0x16 => Self::Power,
            0x17 => Self::ForceFeedbackStatus,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub fn as_raw(self) -> u16 {
        match self {
            Self::Synchronization => 0x00,
            Self::Key => 0x01,
            Self::Relative => 0x02,
            Self::Absolute => 0x03,
            Self::Misc => 0x04,
            Self::Switch => 0x05,
            Self::Led => 0x11,
            Self::Sound => 0x12,
            Self::Repeat => 0x14,
            Self::ForceFeedback => 0x15,
            Self::Power => 0x16,
            Self::ForceFeedbackStatus => 0x17,
            Self::Other(raw) => raw,
        }
    }
}

/// A single event as read from the source device.
///
/// Never stored beyond one trip through the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
    /// Kernel timestamp of the source event.
    pub timestamp: SystemTime,
}

impl RawEvent {
    #[must_use]
    pub fn new(kind: EventKind, code: u16, value: i32) -> Self {
        Self {
            kind,
            code,
            value,
            timestamp: SystemTime::now(),
        }
    }

    /// Shorthand for an `EV_ABS` event.
    #[must_use]
    pub fn absolute(code: u16, value: i32) -> Self {
        Self::new(EventKind::Absolute, code, value)
    }

    /// Shorthand for `SYN_REPORT`.
    #[must_use]
    pub fn syn_report() -> Self {
        Self::new(EventKind::Synchronization, SYN_REPORT, 0)
    }

    /// The same event carrying a different value.
    #[must_use]
    pub fn with_value(self, value: i32) -> Self {
        Self { value, ..self }
    }

    /// Whether this is the kernel's buffer-overflow marker.
    #[must_use]
    pub fn is_sync_dropped(&self) -> bool {
        self.kind == EventKind::Synchronization && self.code == SYN_DROPPED
    }

    /// The remapped axis this event reports, if it is one.
    #[must_use]
    pub fn mapped_axis(&self) -> Option<MappedAxis> {
        if self.kind == EventKind::Absolute {
            MappedAxis::from_code(self.code)
        } else {
            None
        }
    }
}

/// The closed set of absolute axes whose values are rescaled.
///
/// Every other axis passes through unchanged. Adding an axis here is the
/// only way to extend remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MappedAxis {
    X,
    Y,
    MtPositionX,
    MtPositionY,
}

impl MappedAxis {
    pub const ALL: [Self; 4] = [Self::X, Self::Y, Self::MtPositionX, Self::MtPositionY];

    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            ABS_X => Some(Self::X),
            ABS_Y => Some(Self::Y),
            ABS_MT_POSITION_X => Some(Self::MtPositionX),
            ABS_MT_POSITION_Y => Some(Self::MtPositionY),
            _ => None,
        }
    }

    /// The `ABS_*` code of this axis.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::X => ABS_X,
            Self::Y => ABS_Y,
            Self::MtPositionX => ABS_MT_POSITION_X,
            Self::MtPositionY => ABS_MT_POSITION_Y,
        }
    }

    /// Dense index into per-axis tables.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::MtPositionX => 2,
            Self::MtPositionY => 3,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "ABS_X",
            Self::Y => "ABS_Y",
            Self::MtPositionX => "ABS_MT_POSITION_X",
            Self::MtPositionY => "ABS_MT_POSITION_Y",
        }
    }
}

impl std::fmt::Display for MappedAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
