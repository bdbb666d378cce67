use std::path::PathBuf;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::stream::StreamBroadcaster;

/// Feeds the broadcaster from a JPEG file on disk, re-reading it on every
/// tick. Stands in for a camera when the server runs standalone.
#[derive(Debug, Clone)]
pub struct FileFrameSource {
    path: PathBuf,
    interval: Duration,
}

impl FileFrameSource {
    pub fn new(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
        }
    }

    /// Reads the file once and publishes it. Returns the number of
    /// deliveries started.
    pub async fn publish_once(&self, broadcaster: &StreamBroadcaster) -> std::io::Result<usize> {
        if broadcaster.subscriber_count().await == 0 {
            return Ok(0);
        }
        let frame = tokio::fs::read(&self.path).await?;
        Ok(broadcaster.publish(frame).await)
    }

    pub fn spawn(self, broadcaster: StreamBroadcaster) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(path = %self.path.display(), interval = ?self.interval, "Frame source started");
            let mut ticker = tokio::time::interval(self.interval);
            let mut failing = false;

            loop {
                ticker.tick().await;
                match self.publish_once(&broadcaster).await {
                    Ok(_) => failing = false,
                    Err(e) if !failing => {
                        tracing::warn!(path = %self.path.display(), error = %e, "Failed to read frame");
                        failing = true;
                    }
                    Err(_) => {}
                }
            }
        })
    }
}
