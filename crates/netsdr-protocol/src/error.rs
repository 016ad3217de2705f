//! Error types for message encoding and decoding

use thiserror::Error;

/// Errors raised while building outgoing messages
///
/// These indicate a caller bug (a field that cannot be represented in the
/// wire format) and should surface loudly rather than be retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Message type does not fit the 3-bit header field
    #[error("message type out of range: {0} (valid 0..=7)")]
    TypeOutOfRange(u8),

    /// Message length does not fit the 13-bit header field
    #[error("message length out of range: {0} (valid 0..=8191)")]
    LengthOutOfRange(usize),
}

/// Errors raised while decoding inbound framing
///
/// Inbound data that fails to decode is treated as corruption: the unit is
/// dropped and the stream keeps flowing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Header slice was not exactly two bytes
    #[error("header must be 2 bytes, got {0}")]
    TruncatedHeader(usize),

    /// Datagram too short to carry the framing prefix
    #[error("frame too short: need at least {needed} bytes, got {got}")]
    TruncatedFrame { needed: usize, got: usize },

    /// Control item id is not one this crate models
    #[error("unknown control item: 0x{0:04X}")]
    UnknownControlItem(u16),

    /// Parameter block shorter than the control item requires
    #[error("parameter block too short: need {needed} bytes, got {got}")]
    TruncatedParameters { needed: usize, got: usize },
}
