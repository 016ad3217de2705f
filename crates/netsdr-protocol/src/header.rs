//! 16-bit message header packing
//!
//! Every message on the control channel and every streaming datagram starts
//! with the same 2-byte header:
//!
//! ```text
//! bits 15..13   message type (3 bits)
//! bits 12..0    total message length in bytes, header included (13 bits)
//! ```
//!
//! The packed value is transmitted least-significant byte first, so the
//! first byte on the wire is the low eight bits of the length and the second
//! byte carries the type in its top three bits.

use crate::error::{EncodeError, ParseError};

/// Size of the packed message header in bytes
pub const HEADER_LEN: usize = 2;

/// Largest length representable in the 13-bit field
pub const MAX_MESSAGE_LEN: u16 = 0x1FFF;

/// Length of a header-only NAK response
pub const NAK_MESSAGE_LEN: u16 = 2;

/// Message types carried in the 3-bit header field
///
/// Host-originated commands all use [`MessageType::SetControlItem`]; the
/// remaining values appear on responses and on the streaming data port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    /// Host sets a control item
    SetControlItem = 0,
    /// Host requests the current value of a control item
    RequestControlItem = 1,
    /// Host requests the valid range of a control item
    RequestControlItemRange = 2,
    /// Acknowledge for a data item
    DataItemAck = 3,
    /// Data item 0 (sample stream frames)
    DataItem0 = 4,
    /// Data item 1
    DataItem1 = 5,
    /// Data item 2
    DataItem2 = 6,
    /// Data item 3
    DataItem3 = 7,
}

impl MessageType {
    /// Decode the 3-bit type field
    ///
    /// All eight values are defined, so after masking this cannot fail.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => MessageType::SetControlItem,
            1 => MessageType::RequestControlItem,
            2 => MessageType::RequestControlItemRange,
            3 => MessageType::DataItemAck,
            4 => MessageType::DataItem0,
            5 => MessageType::DataItem1,
            6 => MessageType::DataItem2,
            _ => MessageType::DataItem3,
        }
    }
}

/// Pack a raw type/length pair into header bytes
///
/// Both fields are range-checked: `ty` must fit in 3 bits and `length` in
/// 13. Prefer [`FrameHeader::encode`] when the type is already a
/// [`MessageType`].
pub fn encode_header(ty: u8, length: u16) -> Result<[u8; HEADER_LEN], EncodeError> {
    if ty > 7 {
        return Err(EncodeError::TypeOutOfRange(ty));
    }
    if length > MAX_MESSAGE_LEN {
        return Err(EncodeError::LengthOutOfRange(length as usize));
    }

    let packed = (length & 0xFF) | (u16::from(ty) << 13) | ((length >> 8) << 8);
    Ok([(packed & 0xFF) as u8, (packed >> 8) as u8])
}

/// Decoded view of the 2-byte message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Message type from the top three bits
    pub message_type: MessageType,
    /// Total message length in bytes, header included
    pub length: u16,
}

impl FrameHeader {
    /// Build a header for a message of the given total length
    pub fn new(message_type: MessageType, length: u16) -> Self {
        Self {
            message_type,
            length,
        }
    }

    /// Pack into wire bytes; fails if `length` exceeds the 13-bit field
    pub fn encode(&self) -> Result<[u8; HEADER_LEN], EncodeError> {
        encode_header(self.message_type as u8, self.length)
    }

    /// Decode from exactly two bytes
    ///
    /// The length comes back from the first byte plus the low five bits of
    /// the second; the type from the top three bits of the second. This is
    /// the exact inverse of [`encode_header`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() != HEADER_LEN {
            return Err(ParseError::TruncatedHeader(bytes.len()));
        }

        let length = u16::from(bytes[0]) | (u16::from(bytes[1] & 0x1F) << 8);
        let message_type = MessageType::from_bits(bytes[1] >> 5);

        Ok(Self {
            message_type,
            length,
        })
    }

    /// A header-only response of length 2 is the device's NAK
    pub fn is_nak(&self) -> bool {
        self.length == NAK_MESSAGE_LEN
    }
}
