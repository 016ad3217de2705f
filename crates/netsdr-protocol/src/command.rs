//! Control item commands
//!
//! A host command is one complete message:
//!
//! ```text
//! [header:2][control item:2 LE][parameters:N]
//! ```
//!
//! Only the two control items needed for capture control are modeled:
//! receiver state (run/idle, item 0x0018) and receiver frequency
//! (item 0x0020). The parameter layouts follow the receiver's native
//! little-endian byte order.

use crate::error::{EncodeError, ParseError};
use crate::header::{encode_header, MessageType, HEADER_LEN};

/// Size of the control item identifier in bytes
pub const CONTROL_ITEM_LEN: usize = 2;

/// 16-bit control item identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlItem {
    /// Receiver run/idle state
    ReceiverState = 0x0018,
    /// Receiver channel frequency
    ReceiverFrequency = 0x0020,
}

impl TryFrom<u16> for ControlItem {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0018 => Ok(Self::ReceiverState),
            0x0020 => Ok(Self::ReceiverFrequency),
            other => Err(ParseError::UnknownControlItem(other)),
        }
    }
}

/// Sample data format on the streaming channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// Real 16-bit samples
    Real,
    /// Complex I/Q samples
    Complex,
}

impl DataType {
    /// Channel-type parameter byte; bit 7 marks complex data
    fn channel_byte(self) -> u8 {
        match self {
            DataType::Real => 0x00,
            DataType::Complex => 0x80,
        }
    }
}

/// Capture mode: sample bit depth and streaming cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaptureMode {
    /// Contiguous 16-bit streaming
    Contiguous16 = 0x00,
    /// Contiguous 24-bit streaming
    Contiguous24 = 0x80,
    /// 16-bit FIFO capture; the only mode that uses the block count
    Fifo16 = 0x01,
    /// Pulsed 24-bit capture
    Pulse24 = 0x83,
    /// Pulsed 16-bit capture
    Pulse16 = 0x03,
}

/// Receiver run state parameter byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    /// Streaming stopped
    Idle = 0x01,
    /// Streaming active
    Run = 0x02,
}

/// Receiver channel selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelId {
    /// Channel 1
    Channel1 = 0x00,
    /// Channel 2
    Channel2 = 0x02,
}

/// A complete host command, ready to encode to wire bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Put the receiver into the run state and start streaming
    StartCapture {
        /// Sample format for the stream
        data: DataType,
        /// Bit depth and cadence
        mode: CaptureMode,
        /// Sample block count; only meaningful for [`CaptureMode::Fifo16`]
        /// and forced to zero for every other mode
        fifo_blocks: u8,
    },
    /// Put the receiver into the idle state
    StopCapture,
    /// Tune a channel
    ///
    /// Only the low 40 bits of `hz` are representable on the wire; anything
    /// above is discarded at this layer, so callers validate range upstream.
    SetFrequency {
        /// Channel to tune
        channel: ChannelId,
        /// Frequency in Hz
        hz: u64,
    },
}

impl ControlCommand {
    /// Control item this command sets
    pub fn control_item(&self) -> ControlItem {
        match self {
            ControlCommand::StartCapture { .. } | ControlCommand::StopCapture => {
                ControlItem::ReceiverState
            }
            ControlCommand::SetFrequency { .. } => ControlItem::ReceiverFrequency,
        }
    }

    /// Encode the full wire message: header, item id, parameter block
    ///
    /// The total length is computed from the parameter block and re-checked
    /// against the 13-bit header field.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let params = self.parameter_bytes();
        let total = HEADER_LEN + CONTROL_ITEM_LEN + params.len();
        let header = encode_header(MessageType::SetControlItem as u8, total as u16)?;
        let item = self.control_item() as u16;

        let mut message = Vec::with_capacity(total);
        message.extend_from_slice(&header);
        message.extend_from_slice(&item.to_le_bytes());
        message.extend_from_slice(&params);
        Ok(message)
    }

    fn parameter_bytes(&self) -> Vec<u8> {
        match self {
            ControlCommand::StartCapture {
                data,
                mode,
                fifo_blocks,
            } => {
                let blocks = if *mode == CaptureMode::Fifo16 {
                    *fifo_blocks
                } else {
                    0
                };
                vec![data.channel_byte(), RunState::Run as u8, *mode as u8, blocks]
            }
            ControlCommand::StopCapture => vec![0x00, RunState::Idle as u8, 0x00, 0x00],
            ControlCommand::SetFrequency { channel, hz } => {
                let f = hz.to_le_bytes();
                vec![*channel as u8, f[0], f[1], f[2], f[3], f[4]]
            }
        }
    }
}
