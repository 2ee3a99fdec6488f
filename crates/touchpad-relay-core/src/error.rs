//! Relay errors.

use thiserror::Error;
use touchpad_relay_input::InputError;
use touchpad_relay_types::{CalibrationError, MappedAxis};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot remap {axis}: {side} {source}")]
    Calibration {
        axis: MappedAxis,
        side: &'static str,
        source: CalibrationError,
    },

    #[error("source device cannot keep up, event stream lost sync")]
    SyncLost,

    #[error("failed to read from source device: {0}")]
    Read(#[source] InputError),

    #[error("failed to forward event to destination device: {0}")]
    Forward(#[source] InputError),

    #[error("input error: {0}")]
    Input(#[from] InputError),
}
