//! Virtual device task
//!
//! Serves a [`VirtualReceiver`] over an async byte stream. The task reads
//! control messages, applies them, writes the acknowledgement back and
//! emits a state event on every processed command. Tests connect the other
//! end of a `tokio::io::duplex` pair to a client.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::VirtualReceiver;

/// Commands for the device task
#[derive(Debug, Clone)]
pub enum VirtualDeviceCommand {
    /// Shut the device task down
    Shutdown,
}

/// State snapshot emitted after each processed command
#[derive(Debug, Clone)]
pub struct ReceiverStateEvent {
    /// Current tuned frequency in Hz
    pub frequency_hz: u64,
    /// Whether the receiver is streaming
    pub running: bool,
}

/// Run the virtual device task
///
/// Control messages arrive on `stream` one message per write, matching how
/// the client issues commands. The task ends when the stream closes, a
/// shutdown command arrives or the command channel drops.
pub async fn run_virtual_device_task<S>(
    mut stream: S,
    mut receiver: VirtualReceiver,
    mut cmd_rx: mpsc::Receiver<VirtualDeviceCommand>,
    state_tx: broadcast::Sender<ReceiverStateEvent>,
) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = [0u8; 1024];
    info!("virtual receiver task started");

    let _ = state_tx.send(ReceiverStateEvent {
        frequency_hz: receiver.frequency_hz(),
        running: receiver.is_running(),
    });

    loop {
        tokio::select! {
            result = stream.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        debug!("control stream closed");
                        break;
                    }
                    Ok(n) => {
                        let response = receiver.handle_command(&buf[..n]);
                        stream.write_all(&response).await?;
                        stream.flush().await?;

                        let _ = state_tx.send(ReceiverStateEvent {
                            frequency_hz: receiver.frequency_hz(),
                            running: receiver.is_running(),
                        });
                    }
                    Err(e) => {
                        warn!("virtual receiver stream error: {}", e);
                        return Err(e);
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(VirtualDeviceCommand::Shutdown) | None => {
                        debug!("shutdown requested for virtual receiver");
                        break;
                    }
                }
            }
        }
    }

    info!("virtual receiver task ended");
    Ok(())
}
