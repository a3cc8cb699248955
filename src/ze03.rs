//! Winsen ZE03-class gas module: framed binary protocol over UART.
//!
//! The module converses in fixed 9-byte frames:
//! start marker, source/address byte, command byte, up to four payload
//! bytes, and a trailing two's-complement checksum. This driver owns frame
//! synchronization, checksum validation and the query-and-answer read
//! sequence; the byte transport and clock come in through the
//! [`SerialPort`] and [`Clock`] seams.

use arrayvec::ArrayVec;
use core::time::Duration;

use crate::common::error::NodeError;
use crate::common::hal::{block_with_deadline, Clock, SerialPort};
use crate::common::timing;

/// Length of every protocol frame.
pub const FRAME_LEN: usize = 9;
/// Start marker of every frame.
pub const FRAME_START: u8 = 0xFF;

/// Host address byte in outgoing command frames.
const ADDR_HOST: u8 = 0x01;
/// Command: switch the module to query-and-answer mode.
const CMD_SET_QUERY_MODE: u8 = 0x78;
/// Payload selector for query-and-answer mode.
const MODE_QUERY: u8 = 0x04;
/// Command: report the latest concentration.
const CMD_READ_CONCENTRATION: u8 = 0x86;

/// Computes the frame checksum: the two's-complement negation of the sum of
/// bytes `[1..=len-2]`, mod 256. Not a CRC.
pub fn checksum(frame: &[u8]) -> u8 {
    let sum = frame[1..frame.len() - 1]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    (!sum).wrapping_add(1)
}

fn verify_checksum<E: core::fmt::Debug>(frame: &[u8; FRAME_LEN]) -> Result<(), NodeError<E>> {
    let calculated = checksum(frame);
    let expected = frame[FRAME_LEN - 1];
    if calculated != expected {
        return Err(NodeError::ChecksumMismatch {
            expected,
            calculated,
        });
    }
    Ok(())
}

/// Driver for the ZE03-class gas module.
///
/// Owns the serial transport for the cycle's duration; the clock is passed
/// per call so it can be shared with the rest of the node.
#[derive(Debug)]
pub struct Ze03<S: SerialPort> {
    serial: S,
}

impl<S: SerialPort> Ze03<S> {
    pub fn new(serial: S) -> Self {
        Ze03 { serial }
    }

    #[cfg(test)]
    pub(crate) fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Discards any stale bytes sitting in the receive buffer.
    ///
    /// Required before every command: a half-received unsolicited frame
    /// would otherwise misalign the next response.
    fn purge_input(&mut self) {
        while self.serial.read_byte().is_ok() {}
    }

    fn send_frame<C: Clock>(
        &mut self,
        clock: &mut C,
        frame: &[u8; FRAME_LEN],
    ) -> Result<(), NodeError<S::Error>> {
        self.purge_input();
        for byte in frame {
            let serial = &mut self.serial;
            block_with_deadline(
                clock,
                timing::BYTE_WRITE_TIMEOUT,
                timing::SERIAL_POLL_INTERVAL_US,
                || serial.write_byte(*byte),
            )?;
        }
        let serial = &mut self.serial;
        block_with_deadline(
            clock,
            timing::FLUSH_TIMEOUT,
            timing::SERIAL_POLL_INTERVAL_US,
            || serial.flush(),
        )
    }

    /// Switches the module to query-and-answer (passive) mode.
    ///
    /// Succeeds only when the acknowledgement frame echoes the command,
    /// passes the checksum and carries status byte `0x01`.
    pub fn set_query_mode<C: Clock>(&mut self, clock: &mut C) -> Result<(), NodeError<S::Error>> {
        let mut cmd = [
            FRAME_START,
            ADDR_HOST,
            CMD_SET_QUERY_MODE,
            MODE_QUERY,
            0,
            0,
            0,
            0,
            0,
        ];
        cmd[FRAME_LEN - 1] = checksum(&cmd);
        self.send_frame(clock, &cmd)?;

        let resp = self.read_frame(clock, timing::QUERY_MODE_RESPONSE_TIMEOUT)?;
        if resp[0] != FRAME_START || resp[1] != CMD_SET_QUERY_MODE {
            return Err(NodeError::FrameHeader);
        }
        verify_checksum(&resp)?;
        if resp[2] != 0x01 {
            return Err(NodeError::CommandRejected);
        }
        Ok(())
    }

    /// Requests the latest concentration reading. No synchronous response;
    /// the answer frame is collected by a subsequent [`Self::read_frame`].
    pub fn request_concentration<C: Clock>(
        &mut self,
        clock: &mut C,
    ) -> Result<(), NodeError<S::Error>> {
        let mut cmd = [
            FRAME_START,
            ADDR_HOST,
            CMD_READ_CONCENTRATION,
            0,
            0,
            0,
            0,
            0,
            0,
        ];
        cmd[FRAME_LEN - 1] = checksum(&cmd);
        self.send_frame(clock, &cmd)
    }

    /// Accumulates one 9-byte frame, byte at a time, against a single
    /// monotonic deadline. A partially filled buffer is discarded on
    /// timeout, never returned as valid.
    pub fn read_frame<C: Clock>(
        &mut self,
        clock: &mut C,
        timeout: Duration,
    ) -> Result<[u8; FRAME_LEN], NodeError<S::Error>> {
        let deadline = clock.now() + timeout;
        let mut buf = ArrayVec::<u8, FRAME_LEN>::new();
        loop {
            match self.serial.read_byte() {
                Ok(byte) => {
                    buf.push(byte);
                    if buf.is_full() {
                        let mut frame = [0u8; FRAME_LEN];
                        frame.copy_from_slice(&buf);
                        return Ok(frame);
                    }
                }
                Err(nb::Error::WouldBlock) => {
                    if clock.now() >= deadline {
                        return Err(NodeError::Timeout);
                    }
                    clock.delay_us(timing::SERIAL_POLL_INTERVAL_US);
                }
                Err(nb::Error::Other(e)) => return Err(NodeError::Io(e)),
            }
        }
    }

    /// Full read sequence: best-effort mode switch, request, response.
    ///
    /// Returns the concentration in ppm. The raw 16-bit big-endian magnitude
    /// is scaled by the decimal-resolution selector byte; a selector outside
    /// the documented range is rejected, not treated as unit resolution.
    pub fn read_concentration<C: Clock>(
        &mut self,
        clock: &mut C,
    ) -> Result<f32, NodeError<S::Error>> {
        // The mode switch is retried on every read; a module already in
        // query mode answers with a failure status, which is fine to ignore.
        let _ = self.set_query_mode(clock);
        self.request_concentration(clock)?;

        let frame = self.read_frame(clock, timing::CONCENTRATION_RESPONSE_TIMEOUT)?;
        if frame[0] != FRAME_START || frame[1] != CMD_READ_CONCENTRATION {
            return Err(NodeError::FrameHeader);
        }
        verify_checksum(&frame)?;

        let raw = u16::from_be_bytes([frame[2], frame[3]]);
        let resolution = match frame[5] {
            0 => 1.0,
            1 => 0.1,
            2 => 0.01,
            other => return Err(NodeError::InvalidResolution(other)),
        };
        Ok(f32::from(raw) * resolution)
    }
}
