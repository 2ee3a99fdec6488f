//! Per-event classification: rescale or pass through.

use touchpad_relay_types::{MappedAxis, RawEvent};
use tracing::debug;

use crate::error::RelayError;
use crate::forward::Forwarder;
use crate::transform::TransformTable;

/// Receives the (axis, raw, mapped) triple for every rescaled event.
///
/// Called synchronously before the event is forwarded; implementations must
/// not block.
pub trait MappingObserver: Send {
    fn mapped(&mut self, axis: MappedAxis, raw: i32, mapped: i32);
}

/// Emits one `debug!` record per rescaled event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MappingObserver for TracingObserver {
    fn mapped(&mut self, axis: MappedAxis, raw: i32, mapped: i32) {
        debug!(code = axis.code(), axis = %axis, raw, mapped, "mapping");
    }
}

/// Discards mapping diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl MappingObserver for SilentObserver {
    fn mapped(&mut self, _axis: MappedAxis, _raw: i32, _mapped: i32) {}
}

/// Decides per event whether it is rescaled, then hands it on.
///
/// Only `EV_ABS` events on the [`MappedAxis`] allow-list that also have a
/// configured transform are rescaled. Everything else, including other
/// absolute axes such as pressure, passes through with its value intact.
pub struct Dispatcher {
    transforms: TransformTable,
    observer: Box<dyn MappingObserver>,
    transformed: u64,
}

impl Dispatcher {
    pub fn new(transforms: TransformTable, observer: Box<dyn MappingObserver>) -> Self {
        Self {
            transforms,
            observer,
            transformed: 0,
        }
    }

    /// Return the event as it should be forwarded.
    pub fn dispatch(&mut self, event: RawEvent) -> RawEvent {
        let Some(axis) = event.mapped_axis() else {
            return event;
        };
        let Some(transform) = self.transforms.get(axis) else {
            return event;
        };

        let mapped = transform.apply(event.value);
        self.observer.mapped(axis, event.value, mapped);
        self.transformed += 1;
        event.with_value(mapped)
    }

    /// Dispatch one event and forward the result.
    pub fn route(&mut self, event: RawEvent, forwarder: &mut Forwarder) -> Result<(), RelayError> {
        let event = self.dispatch(event);
        forwarder.forward(&event)
    }

    /// Number of events rescaled so far.
    pub fn transformed(&self) -> u64 {
        self.transformed
    }
}
