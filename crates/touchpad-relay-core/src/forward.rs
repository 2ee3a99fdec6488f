//! Ordered, unbuffered delivery of events to the destination device.

use std::path::Path;

use touchpad_relay_input::EventSink;
use touchpad_relay_types::RawEvent;
use tracing::trace;

use crate::error::RelayError;

/// Writes events to the destination in exactly the order they are handed
/// in. A failed write is fatal: the destination would otherwise see e.g. a
/// touch begin with no matching end.
pub struct Forwarder {
    sink: Box<dyn EventSink>,
    forwarded: u64,
}

impl Forwarder {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self { sink, forwarded: 0 }
    }

    pub fn forward(&mut self, event: &RawEvent) -> Result<(), RelayError> {
        self.sink.write(event).map_err(RelayError::Forward)?;
        self.forwarded += 1;
        trace!(kind = ?event.kind, code = event.code, value = event.value, "forwarded");
        Ok(())
    }

    /// Number of events successfully written.
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    pub fn devnode(&self) -> &Path {
        self.sink.devnode()
    }
}
