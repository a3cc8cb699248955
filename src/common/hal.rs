// src/common/hal.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

use super::types::{ClimateSample, LinkStatus};

/// A monotonic point in time, comparable and offsettable by `Duration`.
///
/// Deadline checks in this crate are always performed against a monotonic
/// clock, never a wall clock.
pub trait Instant:
    Copy + Debug + Ord + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> Instant for T where
    T: Copy + Debug + Ord + Add<Duration, Output = T> + Sub<T, Output = Duration>
{
}

/// Abstraction for the monotonic clock and blocking delays.
pub trait Clock {
    type Instant: Instant;

    /// Current monotonic instant.
    fn now(&self) -> Self::Instant;

    /// Block for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Block for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Abstraction for the byte-oriented duplex transport of the gas module.
pub trait SerialPort {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Attempts to read a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` when no byte is available yet.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Attempts to write a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while the transmit buffer is full.
    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Attempts to flush the transmit buffer.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// A push-pull output pin gating a sensor's supply rail.
///
/// Pin configuration is assumed to always succeed; a failure here is a
/// hardware fault outside software's detection ability, so the trait is
/// infallible by contract.
pub trait RailPin {
    /// Configure the pin as an output.
    fn init_output(&mut self);

    /// Drive the pin high (`true`) or low (`false`).
    fn write(&mut self, high: bool);
}

/// Driver seam for the register-addressed single-shot CO2/T/RH sensor.
///
/// `read_measurement` maps the sensor's data-ready polling onto `nb`:
/// it returns `WouldBlock` until a triggered measurement has completed.
pub trait ClimateBus {
    type Error: Debug;

    /// One-time bus/driver initialization for this power-on epoch.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Trigger one on-demand measurement.
    fn start_single_shot(&mut self) -> Result<(), Self::Error>;

    /// Fetch the completed measurement, or `WouldBlock` if not ready yet.
    fn read_measurement(&mut self) -> nb::Result<ClimateSample, Self::Error>;
}

/// Crash-durable byte store underneath the record queue.
///
/// The store must be append-capable and durable at the granularity of a
/// completed write. Only the queue component touches it.
pub trait QueueBackend {
    type Error: Debug;

    /// Mount the underlying storage.
    ///
    /// Implementations should format a wholly unreadable store rather than
    /// fail; that is acceptable for a best-effort telemetry buffer.
    fn mount(&mut self) -> Result<(), Self::Error>;

    /// Current size of the queue in bytes; 0 when absent.
    fn size_bytes(&mut self) -> Result<u64, Self::Error>;

    /// Append `data` as a single completed write.
    fn append(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read up to `buf.len()` bytes starting at `offset`; returns the number
    /// of bytes read, 0 at end of queue.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Delete the entire queue.
    fn wipe(&mut self) -> Result<(), Self::Error>;
}

/// Publish destination on the uplink transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Buffered sensor records, delivered with redundancy.
    Telemetry,
    /// Ephemeral device status, delivered once, best-effort.
    Status,
}

/// Network uplink collaborator: link association, transport session and
/// publishing. Association/encryption details live behind this seam.
pub trait Uplink {
    type Error: Debug;

    /// Establish the station-mode link, bounded by `timeout`.
    fn associate(&mut self, timeout: Duration) -> Result<LinkStatus, Self::Error>;

    /// Open the publish/subscribe session.
    fn open_session(&mut self, client_id: &str) -> Result<(), Self::Error>;

    /// Publish one payload to the given channel.
    fn publish(&mut self, channel: Channel, payload: &[u8]) -> Result<(), Self::Error>;

    /// Close the publish/subscribe session.
    fn close_session(&mut self);

    /// Tear the link down completely (pre-sleep).
    fn shutdown(&mut self);
}

/// Battery voltage sense; `None` when the node has no divider fitted or the
/// conversion yielded a non-finite value.
pub trait BatterySense {
    fn read_volts(&mut self) -> Option<f32>;
}

/// Wake scheduling and low-power entry.
pub trait SleepControl {
    /// Arm the hardware wake timer for `wake_after` and enter the lowest
    /// retainable power state.
    ///
    /// On real hardware this does not return; mock implementations return so
    /// cycle tests can inspect the armed interval.
    fn deep_sleep(&mut self, wake_after: Duration);
}

/// Runs a non-blocking operation repeatedly until it stops returning
/// `WouldBlock`, polling every `poll_us` against a monotonic deadline.
///
/// This is the only suspension primitive in the crate; every blocking wait
/// goes through it (or an equivalent inline deadline loop), so no stuck
/// peripheral can prevent the cycle from eventually reaching sleep.
pub fn block_with_deadline<C, T, E, F>(
    clock: &mut C,
    timeout: Duration,
    poll_us: u32,
    mut f: F,
) -> Result<T, crate::common::error::NodeError<E>>
where
    C: Clock,
    E: Debug,
    F: FnMut() -> nb::Result<T, E>,
{
    let deadline = clock.now() + timeout;
    loop {
        match f() {
            Ok(result) => return Ok(result),
            Err(nb::Error::WouldBlock) => {
                if clock.now() >= deadline {
                    return Err(crate::common::error::NodeError::Timeout);
                }
                clock.delay_us(poll_us);
            }
            Err(nb::Error::Other(e)) => return Err(crate::common::error::NodeError::Io(e)),
        }
    }
}
