//! Draining the source device after a readiness notification.

use touchpad_relay_input::{EventSource, ReadOutcome};
use touchpad_relay_types::RawEvent;
use tracing::error;

use crate::error::RelayError;

/// Read every event queued on `source`, handing each to `handle` in order.
///
/// Returns the number of events read once the source reports nothing more
/// queued. Sync loss and read errors are fatal; so is any error from
/// `handle`, which stops the drain at the failing event.
pub fn drain<F>(source: &mut dyn EventSource, mut handle: F) -> Result<usize, RelayError>
where
    F: FnMut(RawEvent) -> Result<(), RelayError>,
{
    let mut read = 0;
    loop {
        match source.read_next().map_err(RelayError::Read)? {
            ReadOutcome::Event(event) => {
                read += 1;
                handle(event)?;
            }
            ReadOutcome::Drained => return Ok(read),
            ReadOutcome::SyncLost => {
                error!(device = %source.name(), read, "source dropped events, cannot keep up");
                return Err(RelayError::SyncLost);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use touchpad_relay_input::mock::{MockRead, MockSource};
    use touchpad_relay_types::event::ABS_X;

    use super::*;

    fn events(n: i32) -> Vec<MockRead> {
        (0..n)
            .map(|v| MockRead::Event(RawEvent::absolute(ABS_X, v)))
            .collect()
    }

    #[tokio::test]
    async fn drains_whole_batch_in_order() {
        let (mut source, feed) = MockSource::new([]);
        feed.send(events(5)).unwrap();
        source.readable().await.unwrap();

        let mut seen = Vec::new();
        let read = drain(&mut source, |ev| {
            seen.push(ev.value);
            Ok(())
        })
        .unwrap();

        assert_eq!(read, 5);
        assert_eq!(seen, [0, 1, 2, 3, 4]);
        // Nothing left: the next drain is empty.
        assert_eq!(drain(&mut source, |_| Ok(())).unwrap(), 0);
    }

    #[tokio::test]
    async fn sync_loss_is_fatal() {
        let (mut source, feed) = MockSource::new([]);
        let mut batch = events(2);
        batch.push(MockRead::SyncLost);
        batch.extend(events(2));
        feed.send(batch).unwrap();
        source.readable().await.unwrap();

        let mut seen = 0;
        let err = drain(&mut source, |_| {
            seen += 1;
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, RelayError::SyncLost));
        assert_eq!(seen, 2);
    }

    #[tokio::test]
    async fn read_error_is_fatal() {
        let (mut source, feed) = MockSource::new([]);
        feed.send(vec![MockRead::Error("No such device".to_string())])
            .unwrap();
        source.readable().await.unwrap();

        let err = drain(&mut source, |_| Ok(())).unwrap_err();
        assert!(matches!(err, RelayError::Read(_)), "{err}");
        assert!(err.to_string().contains("No such device"));
    }

    #[tokio::test]
    async fn handler_error_stops_drain() {
        let (mut source, feed) = MockSource::new([]);
        feed.send(events(4)).unwrap();
        source.readable().await.unwrap();

        let mut seen = 0;
        let err = drain(&mut source, |_| {
            seen += 1;
            if seen == 2 {
                Err(RelayError::Config("stop".to_string()))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
        assert_eq!(seen, 2);
    }
}
