//! NetSDR Client Engine
//!
//! This crate drives a NetSDR-family SDR receiver: commands go out over a
//! reliable control channel and the sample stream comes back over UDP,
//! landing in an append-only sink.
//!
//! # Architecture
//!
//! - [`ControlSession`] sends one command at a time and validates the
//!   device's acknowledgement (a decoded response length of 2 is the NAK)
//! - [`IngestionPipeline`] runs two cooperating tasks per streaming session:
//!   a receiver filling a bounded queue with datagrams and a writer that
//!   strips the 4-byte framing prefix and appends payload to the sink, both
//!   stopped through one shared cancellation token
//! - [`NetSdrClient`] sequences the two: capture state and the stored
//!   frequency only change after a positive acknowledgement
//!
//! The transport and the sink are collaborators behind narrow traits
//! ([`ControlLink`], [`DatagramSource`], [`SampleSink`]); TCP/UDP and file
//! implementations are provided, and tests substitute in-memory fakes.
//!
//! # Example
//!
//! ```rust,no_run
//! use netsdr_client::{FileSink, NetSdrClient, TcpControlLink, UdpSampleStream};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let link = TcpControlLink::new("192.168.1.50:50000".parse()?);
//! let mut client = NetSdrClient::new(link);
//!
//! client.connect().await?;
//! client.set_frequency(14_010_000).await?;
//!
//! let stream = UdpSampleStream::bind("0.0.0.0:60000".parse()?).await?;
//! let sink = FileSink::create("samples.bin").await?;
//! client.start(stream, sink).await?;
//! // ... capture runs in the background ...
//! client.stop().await?;
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod net;
pub mod pipeline;
pub mod session;
pub mod sink;
pub mod transport;

pub use client::{CaptureState, ClientConfig, NetSdrClient, MAX_FREQUENCY_HZ};
pub use error::{ClientError, CommandError};
pub use net::{TcpControlLink, UdpSampleStream, DEFAULT_CONTROL_PORT, DEFAULT_STREAM_PORT};
pub use pipeline::{IngestionPipeline, OverflowPolicy, PipelineConfig};
pub use session::{ControlSession, ACK_BUFFER_LEN, DEFAULT_ACK_TIMEOUT};
pub use sink::{FileSink, MemorySink};
pub use transport::{ControlLink, DatagramSource, SampleSink, StreamControlLink};
