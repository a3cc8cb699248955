//! Shared layer: error type, platform trait seams, timing constants,
//! compile-time configuration and domain types.

pub mod config;
pub mod error;
pub mod hal;
pub mod timing;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::NodeError;
pub use hal::{
    BatterySense, Channel, ClimateBus, Clock, Instant, QueueBackend, RailPin, SerialPort,
    SleepControl, Uplink,
};
pub use types::{ClimateSample, DeviceIdentity, LinkStatus, RetainedState, SensorReading};
