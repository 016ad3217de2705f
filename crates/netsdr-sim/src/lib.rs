//! NetSDR Simulation Library
//!
//! This crate provides a simulated receiver for exercising the client stack
//! without hardware:
//!
//! - **VirtualReceiver**: applies control messages and answers with
//!   protocol-accurate acknowledgements (echo on success, 2-byte NAK header
//!   on anything it cannot apply), and emits sequenced streaming frames
//! - **run_virtual_device_task**: serves a receiver over any async byte
//!   stream, typically one end of `tokio::io::duplex`
//!
//! # Example
//!
//! ```rust
//! use netsdr_sim::VirtualReceiver;
//! use netsdr_protocol::{ChannelId, ControlCommand};
//!
//! let mut receiver = VirtualReceiver::new();
//!
//! let command = ControlCommand::SetFrequency {
//!     channel: ChannelId::Channel1,
//!     hz: 7_074_000,
//! }
//! .encode()
//! .unwrap();
//!
//! // A valid command is acknowledged by echoing it back
//! let response = receiver.handle_command(&command);
//! assert_eq!(response, command);
//! assert_eq!(receiver.frequency_hz(), 7_074_000);
//! ```

pub mod device;
pub mod receiver;

pub use device::{run_virtual_device_task, ReceiverStateEvent, VirtualDeviceCommand};
pub use receiver::{VirtualReceiver, VirtualReceiverConfig};
