use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::backoff::Backoff;
use crate::api::PlaybackApi;
use crate::fifo;
use crate::models::{OutputFormat, format_track};

pub struct Publisher<A> {
    api: Arc<A>,
    pipe: PathBuf,
    format: OutputFormat,
    interval: Duration,
    backoff: Backoff,
}

impl<A: PlaybackApi> Publisher<A> {
    pub fn new(
        api: Arc<A>,
        pipe: PathBuf,
        format: OutputFormat,
        interval: Duration,
        max_backoff: Duration,
    ) -> Self {
        Self {
            api,
            pipe,
            format,
            interval,
            backoff: Backoff::new(interval, max_backoff),
        }
    }

    pub async fn publish_once(&self) -> Result<String> {
        let details = self
            .api
            .currently_playing()
            .await
            .with_context(|| "Failed to fetch track details")?;

        let message = format_track(details.as_ref(), self.format);
        fifo::write_message(&self.pipe, &message)
            .await
            .with_context(|| format!("Failed to write to {}", self.pipe.display()))?;

        debug!("Published {message:?}");
        Ok(message)
    }

    pub async fn run(mut self) {
        loop {
            let delay = match self.publish_once().await {
                Ok(_) => {
                    self.backoff.reset();
                    self.interval
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    warn!("{e:#}; retrying in {}s", delay.as_secs());
                    delay
                }
            };
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::testing::{RecordingApi, release_pipe};
    use crate::models::TrackDetails;
    use std::path::Path;

    fn publisher(api: RecordingApi, pipe: &Path, format: OutputFormat) -> Publisher<RecordingApi> {
        Publisher::new(
            Arc::new(api),
            pipe.to_path_buf(),
            format,
            Duration::from_millis(10),
            Duration::from_millis(40),
        )
    }

    async fn publish_and_read(publisher: &Publisher<RecordingApi>, pipe: &Path) -> String {
        let reader_path = pipe.to_path_buf();
        let reader = tokio::spawn(async move { fifo::read_to_end(&reader_path).await });
        publisher.publish_once().await.unwrap();
        reader.await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_publishes_track_line() {
        let dir = tempfile::tempdir().unwrap();
        let pipe = dir.path().join("track");
        fifo::create_named_pipe(&pipe).unwrap();

        let api = RecordingApi::playing(TrackDetails::new(
            "Song A".to_string(),
            ["X", "Y"],
            "Album".to_string(),
            0,
            1,
        ));
        let publisher = publisher(api, &pipe, OutputFormat::Line);

        assert_eq!(publish_and_read(&publisher, &pipe).await, "Song A - X, Y");
    }

    #[tokio::test]
    async fn test_publishes_sentinel_when_idle() {
        let dir = tempfile::tempdir().unwrap();
        let pipe = dir.path().join("track");
        fifo::create_named_pipe(&pipe).unwrap();

        let publisher = publisher(RecordingApi::default(), &pipe, OutputFormat::Line);

        assert_eq!(
            publish_and_read(&publisher, &pipe).await,
            "No track currently playing"
        );
    }

    #[tokio::test]
    async fn test_fetch_error_does_not_touch_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let pipe = dir.path().join("track");
        fifo::create_named_pipe(&pipe).unwrap();

        let api = RecordingApi::default();
        *api.fail.lock().unwrap() = true;
        let publisher = publisher(api, &pipe, OutputFormat::Line);

        // No reader is attached, so reaching the pipe would block forever
        let err = publisher.publish_once().await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to fetch track details"));
    }

    #[tokio::test]
    async fn test_run_keeps_publishing_after_errors() {
        let dir = tempfile::tempdir().unwrap();
        let pipe = dir.path().join("track");
        fifo::create_named_pipe(&pipe).unwrap();

        let api = Arc::new(RecordingApi::default());
        *api.fail.lock().unwrap() = true;
        let publisher = Publisher::new(
            Arc::clone(&api),
            pipe.clone(),
            OutputFormat::Line,
            Duration::from_millis(10),
            Duration::from_millis(20),
        );
        let task = tokio::spawn(publisher.run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(api.calls().len() >= 2, "{:?}", api.calls());

        // Recovery: the next cycle gets through to the pipe
        *api.fail.lock().unwrap() = false;
        let message = fifo::read_to_end(&pipe).await.unwrap();
        assert_eq!(message, "No track currently playing");
        assert!(!task.is_finished());

        task.abort();
        let _ = task.await;
        release_pipe(&pipe);
    }
}
