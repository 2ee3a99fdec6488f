//! evdev-based source device.

use std::collections::{HashMap, VecDeque};
use std::future::poll_fn;
use std::path::{Path, PathBuf};
use std::task::Poll;

use async_trait::async_trait;
use evdev::raw_stream::{EventStream, RawDevice};
use touchpad_relay_types::AxisCalibration;
use tracing::{info, trace};

use super::convert;
use crate::error::InputError;
use crate::{EventSource, ReadOutcome};

/// A physical input device read through evdev.
///
/// The device is read through evdev's tokio event stream. Each readiness
/// notification collects every event the kernel has queued;
/// [`EventSource::read_next`] hands them out one at a time.
pub struct EvdevSource {
    path: PathBuf,
    name: String,
    stream: EventStream,
    axes: HashMap<u16, AxisCalibration>,
    pending: VecDeque<evdev::InputEvent>,
}

impl EvdevSource {
    /// Open the device at `path`. Must be called inside a tokio runtime.
    pub fn open(path: &Path) -> Result<Self, InputError> {
        let open_err = |e: std::io::Error| InputError::DeviceOpen(format!("{}: {e}", path.display()));

        let device = RawDevice::open(path).map_err(open_err)?;
        let name = device.name().unwrap_or("Unknown Device").to_string();
        let axes: HashMap<u16, AxisCalibration> = device
            .get_absinfo()
            .map_err(open_err)?
            .map(|(code, info)| (code.0, convert::calibration_from_absinfo(&info)))
            .collect();

        // Switches the node to non-blocking and registers it with the reactor.
        let stream = device.into_event_stream().map_err(open_err)?;

        info!(path = %path.display(), name = %name, axes = axes.len(), "opened source device");
        Ok(Self {
            path: path.to_path_buf(),
            name,
            stream,
            axes,
            pending: VecDeque::new(),
        })
    }
}

#[async_trait]
impl EventSource for EvdevSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn calibration(&self, code: u16) -> Option<AxisCalibration> {
        self.axes.get(&code).copied()
    }

    fn grab(&mut self) -> Result<(), InputError> {
        self.stream
            .device_mut()
            .grab()
            .map_err(|e| InputError::DeviceGrab(format!("{}: {e}", self.path.display())))
    }

    fn ungrab(&mut self) -> Result<(), InputError> {
        self.stream
            .device_mut()
            .ungrab()
            .map_err(|e| InputError::DeviceUngrab(format!("{}: {e}", self.path.display())))
    }

    async fn readable(&mut self) -> Result<(), InputError> {
        if !self.pending.is_empty() {
            return Ok(());
        }
        let first = self
            .stream
            .next_event()
            .await
            .map_err(|e| InputError::Read(e.to_string()))?;
        self.pending.push_back(first);

        // Take the rest of what is already queued, without waiting.
        let Self {
            stream, pending, ..
        } = self;
        poll_fn(|cx| loop {
            match stream.poll_event(cx) {
                Poll::Ready(Ok(event)) => pending.push_back(event),
                Poll::Ready(Err(e)) => return Poll::Ready(Err(InputError::Read(e.to_string()))),
                Poll::Pending => return Poll::Ready(Ok(())),
            }
        })
        .await?;

        trace!(count = self.pending.len(), "fetched source events");
        Ok(())
    }

    fn read_next(&mut self) -> Result<ReadOutcome, InputError> {
        let Some(event) = self.pending.pop_front() else {
            return Ok(ReadOutcome::Drained);
        };
        let event = convert::event_from_evdev(&event);
        if event.is_sync_dropped() {
            self.pending.clear();
            return Ok(ReadOutcome::SyncLost);
        }
        Ok(ReadOutcome::Event(event))
    }
}
