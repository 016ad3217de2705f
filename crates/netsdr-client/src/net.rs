//! TCP control link and UDP sample stream
//!
//! Concrete transports for real hardware: the receiver listens for one
//! control connection on TCP and pushes the sample stream to the host over
//! UDP.

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tracing::{debug, info};

use crate::transport::{ControlLink, DatagramSource};

/// Default TCP port of the control channel
pub const DEFAULT_CONTROL_PORT: u16 = 50_000;

/// Default UDP port the sample stream arrives on
pub const DEFAULT_STREAM_PORT: u16 = 60_000;

/// Largest UDP datagram the stream socket will accept
const MAX_DATAGRAM_LEN: usize = 8192;

/// Control channel over a TCP connection
#[derive(Debug)]
pub struct TcpControlLink {
    addr: SocketAddr,
    stream: Option<TcpStream>,
}

impl TcpControlLink {
    /// Create a link for the given device address; nothing is opened until
    /// [`ControlLink::connect`]
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr, stream: None }
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn stream_mut(&mut self) -> io::Result<&mut TcpStream> {
        self.stream.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "control link not connected")
        })
    }
}

impl ControlLink for TcpControlLink {
    async fn connect(&mut self) -> io::Result<()> {
        let stream = TcpStream::connect(self.addr).await?;
        info!("control link connected to {}", self.addr);
        self.stream = Some(stream);
        Ok(())
    }

    async fn disconnect(&mut self) -> io::Result<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            info!("control link disconnected");
        }
        Ok(())
    }

    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let stream = self.stream_mut()?;
        stream.write_all(bytes).await?;
        stream.flush().await
    }

    async fn recv_response(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream_mut()?.read(buf).await
    }
}

/// Sample stream over a bound UDP socket
#[derive(Debug)]
pub struct UdpSampleStream {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpSampleStream {
    /// Bind the stream socket on the given local address
    pub async fn bind(addr: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        debug!("sample stream bound on {}", addr);
        Ok(Self {
            socket,
            buf: vec![0u8; MAX_DATAGRAM_LEN],
        })
    }
}

impl DatagramSource for UdpSampleStream {
    async fn recv(&mut self) -> io::Result<Vec<u8>> {
        let (n, _peer) = self.socket.recv_from(&mut self.buf).await?;
        Ok(self.buf[..n].to_vec())
    }
}
