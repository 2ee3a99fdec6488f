//! Input subsystem errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to open device: {0}")]
    DeviceOpen(String),

    #[error("failed to grab device: {0}")]
    DeviceGrab(String),

    #[error("failed to release device: {0}")]
    DeviceUngrab(String),

    #[error("failed to create virtual device: {0}")]
    VirtualDeviceCreate(String),

    #[error("failed to read event: {0}")]
    Read(String),

    #[error("failed to write event: {0}")]
    Write(String),

    #[error("invalid recording at line {line}: {reason}")]
    Recording { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
