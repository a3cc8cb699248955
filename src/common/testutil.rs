// src/common/testutil.rs
//
// Test-only mock implementations of the clock and serial seams, shared by
// the driver test modules.

use core::ops::{Add, Sub};
use core::time::Duration;

use super::hal::{Clock, SerialPort};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MockInstant(pub u64);

impl Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

/// Fake monotonic clock; delays simply advance the counter.
#[derive(Debug, Clone)]
pub(crate) struct MockClock {
    pub now_us: u64,
}

impl MockClock {
    pub fn new() -> Self {
        MockClock { now_us: 0 }
    }
}

impl Clock for MockClock {
    type Instant = MockInstant;

    fn now(&self) -> MockInstant {
        MockInstant(self.now_us)
    }

    fn delay_us(&mut self, us: u32) {
        self.now_us = self.now_us.saturating_add(us as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_us = self.now_us.saturating_add(ms as u64 * 1000);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct MockSerialError;

const IO_BUF: usize = 64;

/// Serial mock with staged read bytes and a write log.
///
/// Each staged byte carries a write-gate: it becomes readable only once at
/// least that many bytes have been written. This models a device that only
/// answers after it has received a command, which matters because the
/// driver purges the receive buffer before every command frame.
#[derive(Clone)]
pub(crate) struct MockSerial {
    read_queue: [Option<(u8, usize)>; IO_BUF],
    read_pos: usize,
    staged: usize,
    pub write_log: [Option<u8>; IO_BUF],
    pub write_pos: usize,
    pub fail_writes: bool,
}

impl MockSerial {
    pub fn new() -> Self {
        MockSerial {
            read_queue: [None; IO_BUF],
            read_pos: 0,
            staged: 0,
            write_log: [None; IO_BUF],
            write_pos: 0,
            fail_writes: false,
        }
    }

    /// Stage receive bytes that become readable once `after_writes` bytes
    /// have gone out. Appends to previously staged data.
    pub fn stage_read_data(&mut self, after_writes: usize, data: &[u8]) {
        assert!(self.staged + data.len() <= IO_BUF);
        for byte in data {
            self.read_queue[self.staged] = Some((*byte, after_writes));
            self.staged += 1;
        }
    }

    /// Bytes written so far, in order.
    pub fn written(&self) -> impl Iterator<Item = u8> + '_ {
        self.write_log[..self.write_pos].iter().filter_map(|b| *b)
    }
}

impl SerialPort for MockSerial {
    type Error = MockSerialError;

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        if self.read_pos < IO_BUF {
            if let Some((byte, gate)) = self.read_queue[self.read_pos] {
                if self.write_pos >= gate {
                    self.read_pos += 1;
                    return Ok(byte);
                }
            }
        }
        Err(nb::Error::WouldBlock)
    }

    fn write_byte(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if self.fail_writes || self.write_pos >= IO_BUF {
            return Err(nb::Error::Other(MockSerialError));
        }
        self.write_log[self.write_pos] = Some(byte);
        self.write_pos += 1;
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
