//! Error types for the client

use thiserror::Error;

use netsdr_protocol::{EncodeError, ParseError};

/// Why a control command did not take effect
///
/// Transport faults, silence and explicit device rejection are distinct
/// variants so callers can react differently to each; none of them mutate
/// client state.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Fault on the control channel
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// No acknowledgement arrived in time
    #[error("timed out waiting for acknowledgement")]
    Timeout,

    /// Acknowledgement shorter than a message header
    #[error("acknowledgement too short: {0} bytes")]
    ShortAck(usize),

    /// Acknowledgement header did not decode
    #[error("malformed acknowledgement: {0}")]
    BadAck(#[from] ParseError),

    /// The device answered with a NAK
    #[error("device rejected the command")]
    Rejected,
}

/// Errors surfaced by the client facade
#[derive(Debug, Error)]
pub enum ClientError {
    /// Command could not be built
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Command was sent but did not take effect
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Frequency does not fit the 40-bit tuning field
    #[error("frequency {0} Hz exceeds the 40-bit tuning range")]
    FrequencyOutOfRange(u64),

    /// Start requested while a capture session is active
    #[error("capture already in progress")]
    AlreadyRunning,

    /// Stop requested with no capture session active
    #[error("no capture in progress")]
    NotRunning,
}
