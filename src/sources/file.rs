use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{LineFollowSource, LogEvent};
use crate::config::DEFAULT_CHANNEL_BUFFER;
use crate::error::{LogwallError, Result};

/// A log source that follows a file using `tail -F`, which reopens the file
/// when it is truncated or rotated.
pub struct FileSource {
    path: PathBuf,
    /// Lines of existing content to start from
    backlog: usize,
}

impl FileSource {
    /// Check the file up front so a missing source is reported at startup
    /// rather than as a stream error.
    pub fn open(path: impl AsRef<Path>, backlog: usize) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|e| LogwallError::source_unavailable(path, e.to_string()))?;
        if !metadata.is_file() {
            return Err(LogwallError::source_unavailable(path, "not a regular file"));
        }
        std::fs::File::open(path)
            .map_err(|e| LogwallError::source_unavailable(path, e.to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            backlog,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl LineFollowSource for FileSource {
    async fn stream(&self) -> mpsc::Receiver<LogEvent> {
        let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
        let path = self.path.clone();
        let backlog = self.backlog.to_string();

        tokio::spawn(async move {
            let result = Command::new("tail")
                .arg("-F")
                .arg("-n")
                .arg(&backlog)
                .arg(&path)
                .stdout(std::process::Stdio::piped())
                .stderr(std::process::Stdio::null())
                .kill_on_drop(true)
                .spawn();

            match result {
                Ok(mut child) => {
                    debug!(path = %path.display(), "tail started");
                    if let Some(stdout) = child.stdout.take() {
                        let reader = BufReader::new(stdout);
                        let mut lines = reader.lines();

                        while let Ok(Some(line)) = lines.next_line().await {
                            if tx.send(LogEvent::Line(line)).await.is_err() {
                                break;
                            }
                        }
                    }

                    // Wait for process to exit
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            let _ = tx
                                .send(LogEvent::Error(format!(
                                    "tail exited with status: {}",
                                    status
                                )))
                                .await;
                        }
                        Err(e) => {
                            let _ = tx
                                .send(LogEvent::Error(format!("Error waiting for tail: {}", e)))
                                .await;
                        }
                        _ => {}
                    }

                    let _ = tx.send(LogEvent::EndOfStream).await;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to spawn tail");
                    let _ = tx
                        .send(LogEvent::Error(format!("Failed to spawn tail: {}", e)))
                        .await;
                    let _ = tx.send(LogEvent::EndOfStream).await;
                }
            }
        });

        rx
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::time::{Duration, timeout};

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn next_line(rx: &mut mpsc::Receiver<LogEvent>) -> LogEvent {
        timeout(TIMEOUT, rx.recv())
            .await
            .expect("source timed out")
            .expect("source channel closed")
    }

    #[test]
    fn missing_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::open(dir.path().join("nope.log"), 10).err().unwrap();
        assert!(matches!(err, LogwallError::SourceUnavailable { .. }));
    }

    #[test]
    fn directory_is_not_a_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::open(dir.path(), 10).err().unwrap();
        assert!(err.to_string().contains("not a regular file"));
    }

    #[tokio::test]
    async fn streams_existing_and_appended_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");
        std::fs::write(&path, "line1\n").unwrap();

        let source = FileSource::open(&path, 10).unwrap();
        let mut rx = source.stream().await;
        assert_eq!(next_line(&mut rx).await, LogEvent::Line("line1".to_string()));

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "line2").unwrap();
        file.flush().unwrap();

        assert_eq!(next_line(&mut rx).await, LogEvent::Line("line2".to_string()));
    }

    /// Waits until `want` arrives, skipping anything else
    async fn expect_line(rx: &mut mpsc::Receiver<LogEvent>, want: &str) {
        let wait = async {
            while let Some(event) = rx.recv().await {
                if event == LogEvent::Line(want.to_string()) {
                    return true;
                }
            }
            false
        };
        let found = timeout(Duration::from_secs(10), wait)
            .await
            .expect("line never arrived");
        assert!(found, "source ended before {want:?}");
    }

    #[tokio::test]
    async fn follows_file_across_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "before\n").unwrap();

        let source = FileSource::open(&path, 10).unwrap();
        let mut rx = source.stream().await;
        expect_line(&mut rx, "before").await;

        std::fs::rename(&path, dir.path().join("app.log.1")).unwrap();
        std::fs::write(&path, "after\n").unwrap();

        expect_line(&mut rx, "after").await;
    }

    #[tokio::test]
    async fn follows_file_after_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "old line one\nold line two\n").unwrap();

        let source = FileSource::open(&path, 10).unwrap();
        let mut rx = source.stream().await;
        expect_line(&mut rx, "old line two").await;

        std::fs::write(&path, "").unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "fresh").unwrap();
        file.flush().unwrap();

        expect_line(&mut rx, "fresh").await;
    }
}
