//! Control session: one command, one acknowledgement
//!
//! The device answers every set-control-item message on the control channel
//! by echoing the item (positive acknowledgement) or sending a header-only
//! message of length 2 (NAK). The session validates that verdict by decoding
//! the response header; it never retries.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use netsdr_protocol::{FrameHeader, HEADER_LEN};

use crate::error::CommandError;
use crate::transport::ControlLink;

/// Bytes read while waiting for an acknowledgement; a generous upper bound
/// over the 2-byte header the device actually sends
pub const ACK_BUFFER_LEN: usize = 16;

/// Default time to wait for an acknowledgement
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// Sends commands over a [`ControlLink`] and validates acknowledgements
#[derive(Debug)]
pub struct ControlSession<L> {
    link: L,
    ack_timeout: Duration,
}

impl<L: ControlLink> ControlSession<L> {
    /// Create a session with the default acknowledgement timeout
    pub fn new(link: L) -> Self {
        Self::with_ack_timeout(link, DEFAULT_ACK_TIMEOUT)
    }

    /// Create a session with a custom acknowledgement timeout
    pub fn with_ack_timeout(link: L, ack_timeout: Duration) -> Self {
        Self { link, ack_timeout }
    }

    /// Access the underlying link, e.g. for connect/disconnect
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Send one command and wait for the device's verdict
    ///
    /// Exactly one command is in flight at a time: the write completes
    /// before the acknowledgement read starts.
    pub async fn send_command(&mut self, command: &[u8]) -> Result<(), CommandError> {
        debug!("sending command: {:02X?}", command);
        self.link.send(command).await?;

        let mut buf = [0u8; ACK_BUFFER_LEN];
        let n = timeout(self.ack_timeout, self.link.recv_response(&mut buf))
            .await
            .map_err(|_| CommandError::Timeout)??;

        if n < HEADER_LEN {
            return Err(CommandError::ShortAck(n));
        }

        let header = FrameHeader::decode(&buf[..HEADER_LEN])?;
        if header.is_nak() {
            warn!("device rejected command: {:02X?}", command);
            return Err(CommandError::Rejected);
        }

        debug!("command acknowledged, response length {}", header.length);
        Ok(())
    }
}
