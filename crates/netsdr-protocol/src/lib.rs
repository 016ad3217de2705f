//! NetSDR Protocol Library
//!
//! This crate provides encoding and decoding for the control/streaming
//! protocol spoken by NetSDR-family SDR receivers:
//!
//! - **Message header**: a packed 16-bit prefix carrying a 3-bit message
//!   type and a 13-bit total length
//! - **Control commands**: complete `[header][item id][parameters]` byte
//!   sequences for run/idle state and channel frequency
//! - **Streaming frames**: the `[header][sequence][payload]` layout of the
//!   UDP sample stream
//!
//! Everything here is pure and does no I/O; the session and pipeline layers
//! live in `netsdr-client`.
//!
//! # Example
//!
//! ```rust
//! use netsdr_protocol::{ChannelId, ControlCommand, FrameHeader};
//!
//! // Encode a tune command for channel 1
//! let message = ControlCommand::SetFrequency {
//!     channel: ChannelId::Channel1,
//!     hz: 14_010_000,
//! }
//! .encode()
//! .unwrap();
//! assert_eq!(message[..4], [0x0A, 0x00, 0x20, 0x00]);
//!
//! // The header length field counts the whole message
//! let header = FrameHeader::decode(&message[..2]).unwrap();
//! assert_eq!(header.length as usize, message.len());
//! ```

pub mod command;
pub mod error;
pub mod frame;
pub mod header;

pub use command::{
    CaptureMode, ChannelId, ControlCommand, ControlItem, DataType, RunState, CONTROL_ITEM_LEN,
};
pub use error::{EncodeError, ParseError};
pub use frame::{DataFrame, FRAME_PREFIX_LEN};
pub use header::{
    encode_header, FrameHeader, MessageType, HEADER_LEN, MAX_MESSAGE_LEN, NAK_MESSAGE_LEN,
};
