//! Collaborator contracts for the transport and the persistence sink
//!
//! The protocol engine does not own sockets or files. It drives the device
//! through these narrow traits; the concrete TCP/UDP implementations live in
//! [`crate::net`], the file sink in [`crate::sink`], and tests substitute
//! scripted fakes or `tokio::io::duplex` pairs.
//!
//! All futures carry an explicit `Send` bound so sessions and pipelines can
//! live inside spawned tasks.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reliable control channel to the device
///
/// Commands and their acknowledgements travel over this link, one command in
/// flight at a time. Implementations report faults and do not retry; retry
/// policy belongs to the caller.
pub trait ControlLink: Send {
    /// Establish the link
    fn connect(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Tear the link down; safe to call when not connected
    fn disconnect(&mut self) -> impl Future<Output = io::Result<()>> + Send;

    /// Write one complete command message
    fn send(&mut self, bytes: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Read the next chunk of the acknowledgement into `buf`
    fn recv_response(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

/// Unreliable datagram channel carrying the sample stream
pub trait DatagramSource: Send + 'static {
    /// Wait for the next inbound datagram
    ///
    /// An empty vec means the transport had nothing to deliver; the caller
    /// treats it as recoverable and keeps receiving.
    fn recv(&mut self) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

/// Append-only byte sink for sample payload
///
/// Opened once per streaming session, owned by the pipeline's writer task
/// until teardown.
pub trait SampleSink: Send + 'static {
    /// Append one frame's payload and flush it
    ///
    /// The sequence number is the frame's rolling counter; sinks that do not
    /// care about gap detection ignore it.
    fn write_frame(
        &mut self,
        sequence: u16,
        payload: &[u8],
    ) -> impl Future<Output = io::Result<()>> + Send;

    /// Flush any buffered bytes
    fn flush(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

/// Control link over an already-established byte stream
///
/// Wraps any `AsyncRead + AsyncWrite` pair, such as a `tokio::io::duplex`
/// end in tests or a stream handed over from elsewhere. `connect` and
/// `disconnect` are no-ops.
#[derive(Debug)]
pub struct StreamControlLink<T> {
    io: T,
}

impl<T> StreamControlLink<T> {
    /// Wrap a connected stream
    pub fn new(io: T) -> Self {
        Self { io }
    }

    /// Unwrap the inner stream
    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T> ControlLink for StreamControlLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn connect(&mut self) -> io::Result<()> {
        Ok(())
    }

    async fn disconnect(&mut self) -> io::Result<()> {
        Ok(())
    }

    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.io.write_all(bytes).await?;
        self.io.flush().await
    }

    async fn recv_response(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.io.read(buf).await
    }
}
