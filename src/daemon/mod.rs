use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::PlaybackApi;
use crate::config::Config;
use crate::fifo;
use crate::models::OutputFormat;

mod backoff;
mod control;
mod publisher;
#[cfg(test)]
mod testing;

pub use control::ControlListener;
pub use publisher::Publisher;

#[derive(Debug, Clone)]
pub struct DaemonSettings {
    pub track_pipe: PathBuf,
    pub control_pipe: PathBuf,
    pub interval: Duration,
    pub format: OutputFormat,
    pub max_backoff: Duration,
}

impl DaemonSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            track_pipe: config.track_pipe_path(),
            control_pipe: config.control_pipe_path(),
            interval: config.publish_interval(),
            format: config.publisher.format,
            max_backoff: config.max_backoff(),
        }
    }
}

pub struct Daemon<A> {
    api: Arc<A>,
    settings: DaemonSettings,
}

impl<A: PlaybackApi> Daemon<A> {
    pub fn new(api: A, settings: DaemonSettings) -> Self {
        Self {
            api: Arc::new(api),
            settings,
        }
    }

    pub async fn run(self) -> Result<()> {
        let settings = self.settings;

        fifo::create_named_pipe(&settings.track_pipe)
            .with_context(|| "Failed to set up the track pipe")?;
        fifo::create_named_pipe(&settings.control_pipe)
            .with_context(|| "Failed to set up the control pipe")?;

        let publisher = Publisher::new(
            Arc::clone(&self.api),
            settings.track_pipe.clone(),
            settings.format,
            settings.interval,
            settings.max_backoff,
        );
        let mut publisher_task = tokio::spawn(publisher.run());

        let listener = ControlListener::new(
            Arc::clone(&self.api),
            settings.control_pipe.clone(),
            settings.interval,
            settings.max_backoff,
        );

        info!(
            "Publishing to {} every {}s, listening on {}",
            settings.track_pipe.display(),
            settings.interval.as_secs(),
            settings.control_pipe.display()
        );

        tokio::select! {
            () = listener.run() => {}
            result = &mut publisher_task => {
                if let Err(e) = result {
                    return Err(anyhow!("Track publisher stopped: {e}"));
                }
            }
            result = tokio::signal::ctrl_c() => {
                result.with_context(|| "Failed to listen for Ctrl-C")?;
                info!("Interrupted, shutting down");
            }
        }

        publisher_task.abort();
        Ok(())
    }
}
