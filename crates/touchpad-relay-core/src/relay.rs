//! The cancellable relay loop.

use std::ops::{Deref, DerefMut};

use touchpad_relay_input::{EventSink, EventSource};
use tracing::{debug, info, warn};

use crate::cancel::Cancellation;
use crate::dispatch::{Dispatcher, MappingObserver};
use crate::error::RelayError;
use crate::forward::Forwarder;
use crate::reader;
use crate::state::LoopState;
use crate::transform::TransformTable;

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Events read from the source.
    pub read: u64,
    /// Events written to the destination.
    pub forwarded: u64,
    /// Events whose value was rescaled.
    pub transformed: u64,
}

/// Relays events from a source device to a destination device.
///
/// The loop waits on two things at once: readiness of the source and the
/// cancellation token. Cancellation is checked first on every iteration, so
/// a busy source cannot starve it. Each readiness notification is drained
/// completely before the loop waits again.
pub struct Relay {
    source: Box<dyn EventSource>,
    dispatcher: Dispatcher,
    forwarder: Forwarder,
    state: LoopState,
    read: u64,
}

impl Relay {
    pub fn new(
        source: Box<dyn EventSource>,
        sink: Box<dyn EventSink>,
        transforms: TransformTable,
        observer: Box<dyn MappingObserver>,
    ) -> Self {
        Self {
            source,
            dispatcher: Dispatcher::new(transforms, observer),
            forwarder: Forwarder::new(sink),
            state: LoopState::Idle,
            read: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            read: self.read,
            forwarded: self.forwarder.forwarded(),
            transformed: self.dispatcher.transformed(),
        }
    }

    /// Grab the source and relay events until cancelled or a fatal error.
    ///
    /// The source is released exactly once on every exit path. An event
    /// being forwarded when cancellation arrives is always written in full.
    pub async fn run(&mut self, mut cancel: Cancellation) -> Result<RelayStats, RelayError> {
        let Self {
            source,
            dispatcher,
            forwarder,
            state,
            read,
        } = self;

        let result = match GrabGuard::acquire(source.as_mut()) {
            Ok(mut source) => {
                transition(state, LoopState::Running);
                info!(
                    source = %source.name(),
                    devnode = %forwarder.devnode().display(),
                    "relay running"
                );

                let result = loop {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            info!("cancellation requested");
                            break Ok(());
                        }
                        ready = source.readable() => {
                            let drained = ready.map_err(RelayError::Read).and_then(|()| {
                                reader::drain(&mut *source, |event| {
                                    dispatcher.route(event, forwarder)
                                })
                            });
                            match drained {
                                Ok(count) => {
                                    *read += count as u64;
                                    debug!(count, "drained source");
                                }
                                Err(e) => break Err(e),
                            }
                        }
                    }
                };

                transition(state, LoopState::Stopping);
                drop(source);
                result
            }
            Err(e) => {
                transition(state, LoopState::Stopping);
                Err(e)
            }
        };
        transition(state, LoopState::Stopped);

        let stats = self.stats();
        match &result {
            Ok(()) => info!(
                read = stats.read,
                forwarded = stats.forwarded,
                transformed = stats.transformed,
                "relay stopped"
            ),
            Err(e) => warn!(error = %e, forwarded = stats.forwarded, "relay failed"),
        }
        result.map(|()| stats)
    }
}

fn transition(state: &mut LoopState, next: LoopState) {
    debug_assert!(state.can_transition_to(next), "{state} -> {next}");
    debug!(from = %state, to = %next, "relay state");
    *state = next;
}

/// Exclusive capture of a source device, released on drop.
pub struct GrabGuard<'a> {
    source: &'a mut dyn EventSource,
}

impl<'a> GrabGuard<'a> {
    pub fn acquire(source: &'a mut dyn EventSource) -> Result<Self, RelayError> {
        source.grab()?;
        info!(device = %source.name(), "grabbed source device");
        Ok(Self { source })
    }
}

impl Deref for GrabGuard<'_> {
    type Target = dyn EventSource;

    fn deref(&self) -> &Self::Target {
        &*self.source
    }
}

impl DerefMut for GrabGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.source
    }
}

impl Drop for GrabGuard<'_> {
    fn drop(&mut self) {
        match self.source.ungrab() {
            Ok(()) => info!(device = %self.source.name(), "released source device"),
            Err(e) => warn!(error = %e, "failed to release source device"),
        }
    }
}

#[cfg(test)]
mod tests {
    use touchpad_relay_input::mock::MockSource;

    use super::*;

    #[test]
    fn guard_releases_once() {
        let (mut source, _feed) = MockSource::new([]);
        let handle = source.handle();
        {
            let guard = GrabGuard::acquire(&mut source).unwrap();
            assert_eq!(guard.name(), "Mock Touchpad");
            assert!(handle.is_grabbed());
        }
        assert!(!handle.is_grabbed());
        assert_eq!(handle.grab_count(), 1);
        assert_eq!(handle.ungrab_count(), 1);
    }

    #[test]
    fn failed_grab_is_not_released() {
        let (mut source, _feed) = MockSource::new([]);
        source.fail_grab();
        let handle = source.handle();
        assert!(GrabGuard::acquire(&mut source).is_err());
        assert_eq!(handle.ungrab_count(), 0);
    }
}
