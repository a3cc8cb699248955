//! Duty-cycled environmental gas sensor node core.
//!
//! This crate implements the acquisition–persistence–delivery pipeline of a
//! battery-powered gas/climate node: wake on a timer, power-sequence and read
//! two heterogeneous sensors (a Winsen ZE03-class gas module over a framed
//! UART protocol, an SCD41-class CO2/T/RH sensor via double single-shot
//! measurements), buffer the reading in a bounded crash-durable queue, and
//! opportunistically flush the queue over an unreliable uplink before going
//! back to deep sleep.
//!
//! All hardware and platform services (UART, measurement bus, persistent
//! byte store, network uplink, battery sense, monotonic clock, sleep timer)
//! are trait seams in [`common::hal`]; the crate itself is platform-free and
//! fully testable on the host.

#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod climate;
pub mod common;
pub mod node;
pub mod queue;
pub mod record;
pub mod ze03;

// Re-export the types most integrations need.
pub use common::config::NodeConfig;
pub use common::error::NodeError;
pub use common::types::{DeviceIdentity, RetainedState, SensorReading};
pub use node::GasNode;
