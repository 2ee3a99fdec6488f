//! evdev/uinput backends for Linux.

mod convert;
mod sink;
mod source;

pub use sink::UinputSink;
pub use source::EvdevSource;
