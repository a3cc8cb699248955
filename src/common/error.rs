// src/common/error.rs

#[derive(Debug, thiserror::Error)]
pub enum NodeError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the platform implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// A bounded wait expired before the condition was met.
    #[error("operation timed out")]
    Timeout,

    /// Response frame start/command bytes did not match the request.
    #[error("frame header mismatch")]
    FrameHeader,

    /// Received checksum byte does not match the computed one.
    #[error("checksum mismatch: expected {expected:#04x}, calculated {calculated:#04x}")]
    ChecksumMismatch { expected: u8, calculated: u8 },

    /// The sensor acknowledged the command with a failure status byte.
    #[error("sensor rejected command")]
    CommandRejected,

    /// Decimal-resolution selector byte outside the documented 0..=2 range.
    #[error("resolution selector out of protocol: {0:#04x}")]
    InvalidResolution(u8),

    /// A record does not fit the fixed line buffer.
    #[error("record exceeds maximum record size")]
    RecordTooLarge,

    /// Record serialization failed.
    #[error("record encoding failed")]
    Encode,

    /// The publish callback refused a record during a drain pass.
    #[error("publish rejected by transport")]
    PublishRejected,
}

// Allow mapping from the underlying platform error.
impl<E: core::fmt::Debug> From<E> for NodeError<E> {
    fn from(e: E) -> Self {
        NodeError::Io(e)
    }
}
