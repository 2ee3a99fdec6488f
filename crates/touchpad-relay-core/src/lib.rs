//! Event pipeline for touchpad-relay.
//!
//! Reads events from a source device, rescales the absolute X/Y axes from
//! the source's calibration to the destination's, and forwards every event
//! in order to the emulated destination device until cancelled.

pub mod cancel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod forward;
pub mod reader;
pub mod relay;
pub mod setup;
pub mod state;
pub mod transform;

pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use config::Config;
pub use dispatch::{Dispatcher, MappingObserver, SilentObserver, TracingObserver};
pub use error::RelayError;
pub use relay::{Relay, RelayStats};
pub use state::LoopState;
pub use transform::{AxisTransform, TransformTable};
