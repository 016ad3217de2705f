//! Virtual receiver simulation
//!
//! Tracks the state a real receiver would hold and answers control messages
//! the way the hardware does: a valid set-control-item message is applied
//! and echoed back (the protocol's positive acknowledgement), anything else
//! gets the 2-byte NAK header.

use serde::{Deserialize, Serialize};
use tracing::debug;

use netsdr_protocol::{
    ControlItem, FrameHeader, MessageType, ParseError, RunState, CONTROL_ITEM_LEN,
    FRAME_PREFIX_LEN, HEADER_LEN, MAX_MESSAGE_LEN,
};

/// Header-only message of length 2
const NAK_RESPONSE: [u8; 2] = [0x02, 0x00];

/// Configuration for creating a virtual receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualReceiverConfig {
    /// Frequency the receiver powers up on, in Hz
    pub initial_frequency_hz: u64,
}

impl Default for VirtualReceiverConfig {
    fn default() -> Self {
        Self {
            initial_frequency_hz: 14_010_000,
        }
    }
}

/// A simulated receiver with protocol-accurate acknowledgements
#[derive(Debug)]
pub struct VirtualReceiver {
    frequency_hz: u64,
    running: bool,
    sequence: u16,
}

impl VirtualReceiver {
    /// Create a receiver with default settings
    pub fn new() -> Self {
        Self::from_config(VirtualReceiverConfig::default())
    }

    /// Create a receiver from configuration
    pub fn from_config(config: VirtualReceiverConfig) -> Self {
        Self {
            frequency_hz: config.initial_frequency_hz,
            running: false,
            sequence: 0,
        }
    }

    /// Current tuned frequency in Hz
    pub fn frequency_hz(&self) -> u64 {
        self.frequency_hz
    }

    /// Whether the receiver is in the run state
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Process one control message and produce the response bytes
    ///
    /// Valid messages are applied and echoed back; malformed or unsupported
    /// ones are answered with the NAK header.
    pub fn handle_command(&mut self, message: &[u8]) -> Vec<u8> {
        match self.apply(message) {
            Ok(()) => message.to_vec(),
            Err(e) => {
                debug!("rejecting command: {}", e);
                NAK_RESPONSE.to_vec()
            }
        }
    }

    fn apply(&mut self, message: &[u8]) -> Result<(), ParseError> {
        if message.len() < HEADER_LEN + CONTROL_ITEM_LEN {
            return Err(ParseError::TruncatedFrame {
                needed: HEADER_LEN + CONTROL_ITEM_LEN,
                got: message.len(),
            });
        }

        let header = FrameHeader::decode(&message[..HEADER_LEN])?;
        if header.message_type != MessageType::SetControlItem
            || header.length as usize != message.len()
        {
            return Err(ParseError::TruncatedFrame {
                needed: header.length as usize,
                got: message.len(),
            });
        }

        let item = u16::from_le_bytes([message[2], message[3]]);
        let params = &message[HEADER_LEN + CONTROL_ITEM_LEN..];

        match ControlItem::try_from(item)? {
            ControlItem::ReceiverState => {
                if params.len() < 4 {
                    return Err(ParseError::TruncatedParameters {
                        needed: 4,
                        got: params.len(),
                    });
                }
                self.running = params[1] == RunState::Run as u8;
                debug!("receiver state set to running={}", self.running);
            }
            ControlItem::ReceiverFrequency => {
                if params.len() < 6 {
                    return Err(ParseError::TruncatedParameters {
                        needed: 6,
                        got: params.len(),
                    });
                }
                let mut bytes = [0u8; 8];
                bytes[..5].copy_from_slice(&params[1..6]);
                self.frequency_hz = u64::from_le_bytes(bytes);
                debug!("receiver tuned to {} Hz", self.frequency_hz);
            }
        }

        Ok(())
    }

    /// Produce the next streaming datagram carrying `payload`
    ///
    /// The sequence number increments per frame, wrapping at 16 bits like
    /// the hardware's rolling counter. Payload beyond what the 13-bit length
    /// field can frame is truncated.
    pub fn next_data_frame(&mut self, payload: &[u8]) -> Vec<u8> {
        let max_payload = MAX_MESSAGE_LEN as usize - FRAME_PREFIX_LEN;
        let payload = &payload[..payload.len().min(max_payload)];

        let total = (FRAME_PREFIX_LEN + payload.len()) as u16;
        let Ok(header) = FrameHeader::new(MessageType::DataItem0, total).encode() else {
            debug!("frame length not representable, skipping");
            return Vec::new();
        };

        let sequence = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);

        let mut datagram = header.to_vec();
        datagram.extend_from_slice(&sequence.to_le_bytes());
        datagram.extend_from_slice(payload);
        datagram
    }
}

impl Default for VirtualReceiver {
    fn default() -> Self {
        Self::new()
    }
}
