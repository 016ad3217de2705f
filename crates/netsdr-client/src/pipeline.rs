//! Concurrent ingestion pipeline
//!
//! Two tasks cooperate per streaming session: a receiver that pulls
//! datagrams off the stream channel into a bounded queue, and a writer that
//! strips the framing prefix and appends sample payload to the sink. Both
//! watch one shared cancellation token; [`IngestionPipeline::shutdown`]
//! cancels it and joins both tasks, so no sink write can happen after it
//! returns.
//!
//! The queue is bounded. With [`OverflowPolicy::Block`] a slow writer
//! backpressures the receiver; with [`OverflowPolicy::DropNewest`] the
//! receiver sheds the incoming datagram and keeps going.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use netsdr_protocol::DataFrame;

use crate::transport::{DatagramSource, SampleSink};

/// Queue settings for one streaming session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Depth of the datagram queue between the two tasks
    pub queue_capacity: usize,
    /// What the receiver does when the queue is full
    pub overflow: OverflowPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            overflow: OverflowPolicy::Block,
        }
    }
}

/// Behaviour when the writer falls behind the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Hold the receiver until the writer drains the queue
    #[default]
    Block,
    /// Drop the incoming datagram and keep receiving
    DropNewest,
}

/// Handles to one running ingestion session
#[derive(Debug)]
pub struct IngestionPipeline {
    cancel: CancellationToken,
    receiver: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl IngestionPipeline {
    /// Launch the receiver and writer tasks
    pub fn spawn<S, W>(source: S, sink: W, config: PipelineConfig) -> Self
    where
        S: DatagramSource,
        W: SampleSink,
    {
        let cancel = CancellationToken::new();
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity.max(1));

        let receiver = tokio::spawn(receive_loop(
            source,
            queue_tx,
            cancel.clone(),
            config.overflow,
        ));
        let writer = tokio::spawn(write_loop(queue_rx, sink, cancel.clone()));

        info!(
            "ingestion pipeline started (queue={}, overflow={:?})",
            config.queue_capacity, config.overflow
        );

        Self {
            cancel,
            receiver,
            writer,
        }
    }

    /// Token shared by both tasks
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel both tasks and wait for them to finish
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.receiver.await;
        let _ = self.writer.await;
        info!("ingestion pipeline stopped");
    }
}

/// Pull datagrams off the stream channel into the queue until cancelled
///
/// A source fault ends this task but leaves the writer free to drain what
/// was already queued.
async fn receive_loop<S: DatagramSource>(
    mut source: S,
    queue: mpsc::Sender<Vec<u8>>,
    cancel: CancellationToken,
    overflow: OverflowPolicy,
) {
    loop {
        let datagram = tokio::select! {
            _ = cancel.cancelled() => break,
            result = source.recv() => match result {
                Ok(data) => data,
                Err(e) => {
                    warn!("stream receive error: {}", e);
                    break;
                }
            },
        };

        if datagram.is_empty() {
            continue;
        }

        match overflow {
            OverflowPolicy::Block => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    sent = queue.send(datagram) => {
                        if sent.is_err() {
                            debug!("writer gone, stopping receiver");
                            break;
                        }
                    }
                }
            }
            OverflowPolicy::DropNewest => match queue.try_send(datagram) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("datagram queue full, dropping frame");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("writer gone, stopping receiver");
                    break;
                }
            },
        }
    }

    debug!("receiver loop ended");
}

/// Dequeue datagrams, strip framing, append payload to the sink
///
/// Malformed datagrams are dropped; a sink fault ends the task. The sink is
/// flushed on the way out.
async fn write_loop<W: SampleSink>(
    mut queue: mpsc::Receiver<Vec<u8>>,
    mut sink: W,
    cancel: CancellationToken,
) {
    loop {
        let datagram = tokio::select! {
            _ = cancel.cancelled() => break,
            item = queue.recv() => match item {
                Some(data) => data,
                None => break,
            },
        };

        match DataFrame::parse(&datagram) {
            Ok(frame) => {
                if let Err(e) = sink.write_frame(frame.sequence, frame.payload).await {
                    warn!("sink write failed: {}", e);
                    break;
                }
            }
            Err(e) => {
                debug!("dropping malformed datagram: {}", e);
            }
        }
    }

    if let Err(e) = sink.flush().await {
        warn!("sink flush failed during teardown: {}", e);
    }
    debug!("writer loop ended");
}
