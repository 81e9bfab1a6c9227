//! Line-follow sources and the ingest tasks that feed buffers from them.
//!
//! A `LineFollowSource` turns a followed file into a stream of `LogEvent`s.
//! The `IngestManager` runs one task per source, appending each line to that
//! source's buffer. Producers and the render tick meet only at the buffer.

pub mod file;
pub mod manager;

use tokio::sync::mpsc;

/// Events emitted by log sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Line(String),
    Error(String),
    EndOfStream,
}

/// Trait for log sources
#[async_trait::async_trait]
pub trait LineFollowSource: Send + Sync {
    /// Start streaming log events
    async fn stream(&self) -> mpsc::Receiver<LogEvent>;

    /// Get the display name for this source
    fn name(&self) -> String;
}
