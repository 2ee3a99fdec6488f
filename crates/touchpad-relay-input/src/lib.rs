//! Device boundary for touchpad-relay.
//!
//! This crate defines the [`EventSource`] and [`EventSink`] traits the relay
//! core drives, the evemu [`recording`] parser that describes the
//! destination device, and the evdev/uinput backends (feature `linux`) and
//! scripted test doubles (feature `mock`) that implement them.

use std::path::Path;

use async_trait::async_trait;
use touchpad_relay_types::{AxisCalibration, RawEvent};

pub mod error;
#[cfg(feature = "linux")]
pub mod linux;
#[cfg(feature = "mock")]
pub mod mock;
pub mod recording;

pub use error::InputError;

/// Result of one non-blocking read attempt on a source device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One event was retrieved.
    Event(RawEvent),
    /// Nothing more is queued; wait for the next readiness notification.
    Drained,
    /// The device dropped events it cannot reconstruct.
    SyncLost,
}

/// A physical device whose events are relayed.
#[async_trait]
pub trait EventSource: Send + 'static {
    /// Human-readable device name, for logging.
    fn name(&self) -> &str;

    /// Calibration of the absolute axis with the given `ABS_*` code.
    fn calibration(&self, code: u16) -> Option<AxisCalibration>;

    /// Take exclusive capture of the device.
    fn grab(&mut self) -> Result<(), InputError>;

    /// Give exclusive capture back.
    fn ungrab(&mut self) -> Result<(), InputError>;

    /// Wait until at least one event can be read without blocking.
    ///
    /// Must be cancel-safe: dropping the future before it resolves loses
    /// no events.
    async fn readable(&mut self) -> Result<(), InputError>;

    /// Pull the next queued event without blocking.
    fn read_next(&mut self) -> Result<ReadOutcome, InputError>;
}

/// The emulated device events are written to.
pub trait EventSink: Send + 'static {
    /// Device node of the emulated device.
    fn devnode(&self) -> &Path;

    /// Write one event. Events are delivered in call order, unbuffered.
    fn write(&mut self, event: &RawEvent) -> Result<(), InputError>;
}
