// src/common/timing.rs

use core::time::Duration;

// Reference bounds from the Winsen ZE03 datasheet and field experience with
// the module; the protocol itself carries no timing information, so every
// receive path needs an explicit deadline.

// === ZE03 framed protocol ===

/// Bound for the query-mode command acknowledgement frame.
pub const QUERY_MODE_RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);
/// Bound for the concentration response frame (the module answers slowly
/// right after a mode switch).
pub const CONCENTRATION_RESPONSE_TIMEOUT: Duration = Duration::from_millis(1200);
/// Bound for accepting a single outgoing byte into the UART FIFO.
pub const BYTE_WRITE_TIMEOUT: Duration = Duration::from_millis(20);
/// Bound for draining the transmit FIFO after a command frame.
pub const FLUSH_TIMEOUT: Duration = Duration::from_millis(50);
/// Idle delay between receive polls while waiting on a frame byte.
pub const SERIAL_POLL_INTERVAL_US: u32 = 500;

// === Single-shot climate sensor ===

/// Bound for one single-shot measurement to become ready (datasheet worst
/// case is ~5 s; generous margin).
pub const SINGLE_SHOT_TIMEOUT: Duration = Duration::from_millis(9_000);
/// Poll interval while waiting on the data-ready flag.
pub const SINGLE_SHOT_POLL_INTERVAL_MS: u32 = 100;

// === Delivery pacing ===

/// Gap between the redundant publishes of one telemetry record.
pub const TRIPLICATE_GAP_MS: u32 = 40;
/// Gap between records during a drain pass.
pub const DRAIN_RECORD_GAP_MS: u32 = 20;
