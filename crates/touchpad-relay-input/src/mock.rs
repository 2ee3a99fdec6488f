//! Mock input backends for testing.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use touchpad_relay_types::{AxisCalibration, RawEvent};

use crate::error::InputError;
use crate::{EventSink, EventSource, ReadOutcome};

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

/// One scripted read result.
#[derive(Debug, Clone)]
pub enum MockRead {
    Event(RawEvent),
    SyncLost,
    /// Fail the read with the given message.
    Error(String),
}

#[derive(Debug, Default)]
struct MockSourceState {
    grabs: usize,
    ungrabs: usize,
    grabbed: bool,
    fail_grab: bool,
}

/// Mock source device for testing.
///
/// Returns a sender that tests use to queue readiness batches. Each batch
/// becomes readable as a unit, the way a single readiness notification
/// covers several queued kernel events. Once the sender is dropped and all
/// batches are consumed, [`EventSource::readable`] never resolves again.
pub struct MockSource {
    name: String,
    axes: HashMap<u16, AxisCalibration>,
    feed_rx: mpsc::UnboundedReceiver<Vec<MockRead>>,
    pending: VecDeque<MockRead>,
    state: Arc<Mutex<MockSourceState>>,
}

impl MockSource {
    /// Create a mock source with the given absolute axes.
    pub fn new(
        axes: impl IntoIterator<Item = (u16, AxisCalibration)>,
    ) -> (Self, mpsc::UnboundedSender<Vec<MockRead>>) {
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        let source = Self {
            name: "Mock Touchpad".to_string(),
            axes: axes.into_iter().collect(),
            feed_rx,
            pending: VecDeque::new(),
            state: Arc::new(Mutex::new(MockSourceState::default())),
        };
        (source, feed_tx)
    }

    /// Make the next [`EventSource::grab`] call fail.
    pub fn fail_grab(&self) {
        self.state.lock().unwrap().fail_grab = true;
    }

    /// Get a clonable handle for observing grab state from tests.
    pub fn handle(&self) -> MockSourceHandle {
        MockSourceHandle {
            state: Arc::clone(&self.state),
        }
    }
}

/// Clonable observer handle for `MockSource`.
#[derive(Clone)]
pub struct MockSourceHandle {
    state: Arc<Mutex<MockSourceState>>,
}

impl MockSourceHandle {
    pub fn grab_count(&self) -> usize {
        self.state.lock().unwrap().grabs
    }

    pub fn ungrab_count(&self) -> usize {
        self.state.lock().unwrap().ungrabs
    }

    pub fn is_grabbed(&self) -> bool {
        self.state.lock().unwrap().grabbed
    }
}

#[async_trait]
impl EventSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn calibration(&self, code: u16) -> Option<AxisCalibration> {
        self.axes.get(&code).copied()
    }

    fn grab(&mut self) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_grab {
            return Err(InputError::DeviceGrab("device busy".to_string()));
        }
        state.grabs += 1;
        state.grabbed = true;
        Ok(())
    }

    fn ungrab(&mut self) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        state.ungrabs += 1;
        state.grabbed = false;
        Ok(())
    }

    async fn readable(&mut self) -> Result<(), InputError> {
        if !self.pending.is_empty() {
            return Ok(());
        }
        match self.feed_rx.recv().await {
            Some(batch) => {
                self.pending.extend(batch);
                Ok(())
            }
            None => std::future::pending().await,
        }
    }

    fn read_next(&mut self) -> Result<ReadOutcome, InputError> {
        match self.pending.pop_front() {
            Some(MockRead::Event(event)) => Ok(ReadOutcome::Event(event)),
            Some(MockRead::SyncLost) => Ok(ReadOutcome::SyncLost),
            Some(MockRead::Error(msg)) => Err(InputError::Read(msg)),
            None => Ok(ReadOutcome::Drained),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSink
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MockSinkState {
    written: Vec<RawEvent>,
    fail_on: Option<usize>,
    attempts: usize,
}

/// Mock destination device for testing.
pub struct MockSink {
    devnode: PathBuf,
    state: Arc<Mutex<MockSinkState>>,
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            devnode: PathBuf::from("/dev/input/event99"),
            state: Arc::new(Mutex::new(MockSinkState::default())),
        }
    }

    /// Fail the `n`-th write (1-based) and every write after it.
    pub fn fail_on(&self, n: usize) {
        self.state.lock().unwrap().fail_on = Some(n);
    }

    /// Get a clonable handle for observing written events from tests.
    pub fn handle(&self) -> MockSinkHandle {
        MockSinkHandle {
            state: Arc::clone(&self.state),
        }
    }
}

/// Clonable observer handle for `MockSink`.
#[derive(Clone)]
pub struct MockSinkHandle {
    state: Arc<Mutex<MockSinkState>>,
}

impl MockSinkHandle {
    /// Snapshot of all successfully written events, in write order.
    pub fn written(&self) -> Vec<RawEvent> {
        self.state.lock().unwrap().written.clone()
    }

    pub fn written_count(&self) -> usize {
        self.state.lock().unwrap().written.len()
    }

    /// Number of write calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }
}

impl EventSink for MockSink {
    fn devnode(&self) -> &Path {
        &self.devnode
    }

    fn write(&mut self, event: &RawEvent) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if state.fail_on.is_some_and(|n| state.attempts >= n) {
            return Err(InputError::Write("no such device".to_string()));
        }
        state.written.push(*event);
        Ok(())
    }
}
