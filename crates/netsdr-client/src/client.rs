//! Client facade
//!
//! Owns the control session, the last acknowledged device state and the
//! lifecycle of the ingestion pipeline. State only moves on a positive
//! acknowledgement: a failed command leaves frequency, capture state and
//! pipeline exactly as they were.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use netsdr_protocol::{CaptureMode, ChannelId, ControlCommand, DataType};

use crate::error::{ClientError, CommandError};
use crate::pipeline::{IngestionPipeline, PipelineConfig};
use crate::session::{ControlSession, DEFAULT_ACK_TIMEOUT};
use crate::transport::{ControlLink, DatagramSource, SampleSink};

/// Highest frequency the 5-byte tuning field can carry
pub const MAX_FREQUENCY_HZ: u64 = (1 << 40) - 1;

/// Capture lifecycle of a client session
///
/// ```text
/// Idle -> Starting -> Running -> Stopping -> Idle
/// ```
///
/// The transient states cover the window between sending a command and the
/// device's verdict; a rejected command falls back to the state it left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No capture active
    Idle,
    /// Run command sent, waiting on the acknowledgement
    Starting,
    /// Pipeline running
    Running,
    /// Idle command sent, waiting on the acknowledgement
    Stopping,
}

/// Client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Frequency assumed at construction, in Hz
    pub initial_frequency_hz: u64,
    /// Sample format requested on start
    pub data: DataType,
    /// Capture mode requested on start
    pub capture: CaptureMode,
    /// How long to wait for a command acknowledgement
    pub ack_timeout: Duration,
    /// Queue settings for the streaming session
    pub pipeline: PipelineConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            initial_frequency_hz: 14_010_000,
            data: DataType::Complex,
            capture: CaptureMode::Contiguous24,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            pipeline: PipelineConfig::default(),
        }
    }
}

/// Facade over the control session and the ingestion pipeline
#[derive(Debug)]
pub struct NetSdrClient<L> {
    session: ControlSession<L>,
    config: ClientConfig,
    state: CaptureState,
    frequency_hz: u64,
    pipeline: Option<IngestionPipeline>,
}

impl<L: ControlLink> NetSdrClient<L> {
    /// Create a client over the given control link with default settings
    pub fn new(link: L) -> Self {
        Self::with_config(link, ClientConfig::default())
    }

    /// Create a client with custom settings
    pub fn with_config(link: L, config: ClientConfig) -> Self {
        let session = ControlSession::with_ack_timeout(link, config.ack_timeout);
        let frequency_hz = config.initial_frequency_hz;

        Self {
            session,
            config,
            state: CaptureState::Idle,
            frequency_hz,
            pipeline: None,
        }
    }

    /// Last acknowledged frequency in Hz
    pub fn frequency_hz(&self) -> u64 {
        self.frequency_hz
    }

    /// Current capture lifecycle state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Whether a capture session is active
    pub fn is_running(&self) -> bool {
        self.state == CaptureState::Running
    }

    /// Open the control link
    ///
    /// Capture state and frequency are untouched either way.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        self.session
            .link_mut()
            .connect()
            .await
            .map_err(CommandError::from)?;
        Ok(())
    }

    /// Close the control link
    ///
    /// Does not stop a running pipeline; call [`NetSdrClient::stop`] first
    /// for an orderly teardown.
    pub async fn disconnect(&mut self) -> Result<(), ClientError> {
        self.session
            .link_mut()
            .disconnect()
            .await
            .map_err(CommandError::from)?;
        Ok(())
    }

    /// Start streaming: send the run command, then launch the pipeline
    ///
    /// `source` and `sink` are owned by the session for its whole lifetime;
    /// a fresh pair is supplied on every start. On a rejected or failed
    /// command the client stays idle and neither is used.
    pub async fn start<S, W>(&mut self, source: S, sink: W) -> Result<(), ClientError>
    where
        S: DatagramSource,
        W: SampleSink,
    {
        if self.state != CaptureState::Idle {
            return Err(ClientError::AlreadyRunning);
        }

        let command = ControlCommand::StartCapture {
            data: self.config.data,
            mode: self.config.capture,
            fifo_blocks: 0,
        }
        .encode()?;

        self.state = CaptureState::Starting;
        match self.session.send_command(&command).await {
            Ok(()) => {
                self.pipeline = Some(IngestionPipeline::spawn(
                    source,
                    sink,
                    self.config.pipeline.clone(),
                ));
                self.state = CaptureState::Running;
                info!("capture started");
                Ok(())
            }
            Err(e) => {
                self.state = CaptureState::Idle;
                warn!("start failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Stop streaming: send the idle command, then tear the pipeline down
    ///
    /// Both pipeline tasks are joined before this returns, so no sink write
    /// can happen afterwards. On a rejected or failed command the pipeline
    /// keeps running and the call can be retried.
    pub async fn stop(&mut self) -> Result<(), ClientError> {
        if self.state != CaptureState::Running {
            return Err(ClientError::NotRunning);
        }

        let command = ControlCommand::StopCapture.encode()?;

        self.state = CaptureState::Stopping;
        match self.session.send_command(&command).await {
            Ok(()) => {
                if let Some(pipeline) = self.pipeline.take() {
                    pipeline.shutdown().await;
                }
                self.state = CaptureState::Idle;
                info!("capture stopped");
                Ok(())
            }
            Err(e) => {
                self.state = CaptureState::Running;
                warn!("stop failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Tune channel 1
    ///
    /// The stored frequency moves only once the device acknowledges; a
    /// failed command leaves the previous value in place.
    pub async fn set_frequency(&mut self, hz: u64) -> Result<(), ClientError> {
        if hz > MAX_FREQUENCY_HZ {
            return Err(ClientError::FrequencyOutOfRange(hz));
        }

        let command = ControlCommand::SetFrequency {
            channel: ChannelId::Channel1,
            hz,
        }
        .encode()?;

        self.session.send_command(&command).await?;
        self.frequency_hz = hz;
        info!("tuned to {} Hz", hz);
        Ok(())
    }
}
