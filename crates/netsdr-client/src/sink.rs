//! Sample sinks
//!
//! The writer task hands every frame's payload to a [`SampleSink`]. The file
//! sink reproduces the capture-to-disk behaviour the receiver tooling
//! expects: append only, payload bytes only, flushed after every frame.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::transport::SampleSink;

/// Appends sample payload to a file, one flush per frame
///
/// The sequence number is not persisted, so the file holds nothing but
/// contiguous sample bytes.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Open (or create) the capture file for appending
    pub async fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self { file })
    }
}

impl SampleSink for FileSink {
    async fn write_frame(&mut self, _sequence: u16, payload: &[u8]) -> io::Result<()> {
        self.file.write_all(payload).await?;
        self.file.flush().await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.file.flush().await
    }
}

/// Collects frames in memory behind a shared handle
///
/// Intended for tests and development: the pipeline owns the sink while an
/// observer keeps a clone of [`MemorySink::frames`] to inspect what arrived.
#[derive(Debug, Default)]
pub struct MemorySink {
    frames: Arc<Mutex<Vec<(u16, Vec<u8>)>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the captured `(sequence, payload)` pairs
    pub fn frames(&self) -> Arc<Mutex<Vec<(u16, Vec<u8>)>>> {
        Arc::clone(&self.frames)
    }
}

impl SampleSink for MemorySink {
    async fn write_frame(&mut self, sequence: u16, payload: &[u8]) -> io::Result<()> {
        self.frames.lock().await.push((sequence, payload.to_vec()));
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
