//! Runs one ingest task per source, appending its lines to its buffer.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{LineFollowSource, LogEvent};
use crate::buffer::LineBuffer;

/// Owns the per-source producer tasks
#[derive(Default)]
pub struct IngestManager {
    handles: Vec<JoinHandle<()>>,
}

impl IngestManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start streaming `source` into `buffer`
    pub async fn add_source(&mut self, buffer: Arc<LineBuffer>, source: Box<dyn LineFollowSource>) {
        let name = source.name();
        let mut source_rx = source.stream().await;

        let handle = tokio::spawn(async move {
            while let Some(event) = source_rx.recv().await {
                match event {
                    LogEvent::Line(line) => buffer.append(line),
                    LogEvent::Error(msg) => {
                        warn!(source = %name, error = %msg, "source error");
                        buffer.set_source_error(msg);
                    }
                    LogEvent::EndOfStream => {
                        info!(source = %name, "source ended");
                        break;
                    }
                }
            }
            debug!(source = %name, "ingest task finished");
        });

        self.handles.push(handle);
    }

    /// Get the number of active sources
    pub fn source_count(&self) -> usize {
        self.handles.len()
    }

    /// Shutdown all source streams
    pub fn shutdown(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl Drop for IngestManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::{Duration, sleep, timeout};

    /// Replays a fixed list of events
    struct ScriptedSource {
        events: Vec<LogEvent>,
    }

    #[async_trait::async_trait]
    impl LineFollowSource for ScriptedSource {
        async fn stream(&self) -> mpsc::Receiver<LogEvent> {
            let (tx, rx) = mpsc::channel(16);
            let events = self.events.clone();
            tokio::spawn(async move {
                for event in events {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
            rx
        }

        fn name(&self) -> String {
            "scripted".to_string()
        }
    }

    async fn wait_for_len(buffer: &LineBuffer, len: usize) {
        timeout(Duration::from_secs(2), async {
            while buffer.len() < len {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("buffer never filled");
    }

    #[tokio::test]
    async fn lines_land_in_the_buffer_in_order() {
        let buffer = Arc::new(LineBuffer::new("scripted", 2));
        let mut manager = IngestManager::new();
        let source = ScriptedSource {
            events: vec![
                LogEvent::Line("a".into()),
                LogEvent::Line("b".into()),
                LogEvent::Line("c".into()),
            ],
        };
        manager.add_source(Arc::clone(&buffer), Box::new(source)).await;
        assert_eq!(manager.source_count(), 1);

        timeout(Duration::from_secs(2), async {
            while buffer.snapshot().last().map(String::as_str) != Some("c") {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("last line never arrived");
        assert_eq!(buffer.snapshot(), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn source_errors_are_recorded() {
        let buffer = Arc::new(LineBuffer::new("scripted", 10));
        let mut manager = IngestManager::new();
        let source = ScriptedSource {
            events: vec![
                LogEvent::Line("a".into()),
                LogEvent::Error("tail exited".into()),
                LogEvent::EndOfStream,
                LogEvent::Line("ignored".into()),
            ],
        };
        manager.add_source(Arc::clone(&buffer), Box::new(source)).await;

        wait_for_len(&buffer, 1).await;
        timeout(Duration::from_secs(2), async {
            while buffer.source_error().is_none() {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("error never recorded");
        sleep(Duration::from_millis(50)).await;
        assert_eq!(buffer.snapshot(), vec!["a"]);
        assert_eq!(buffer.source_error().as_deref(), Some("tail exited"));
    }
}
