use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::backoff::Backoff;
use crate::api::PlaybackApi;
use crate::fifo::{self, CONTROL_BUFFER_SIZE};
use crate::models::ControlCommand;

pub struct ControlListener<A> {
    api: Arc<A>,
    pipe: PathBuf,
    backoff: Backoff,
}

impl<A: PlaybackApi> ControlListener<A> {
    pub fn new(api: Arc<A>, pipe: PathBuf, retry: Duration, max_backoff: Duration) -> Self {
        Self {
            api,
            pipe,
            backoff: Backoff::new(retry, max_backoff),
        }
    }

    pub async fn receive_once(&self) -> Result<Option<ControlCommand>> {
        let message = fifo::read_message(&self.pipe, CONTROL_BUFFER_SIZE)
            .await
            .with_context(|| format!("Failed to read from {}", self.pipe.display()))?;

        let command = ControlCommand::from_message(&message);
        match command {
            Some(command) => dispatch(self.api.as_ref(), command).await,
            None => debug!("Ignoring control message {:?}", message.trim()),
        }
        Ok(command)
    }

    pub async fn run(mut self) {
        loop {
            match self.receive_once().await {
                Ok(_) => self.backoff.reset(),
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    warn!("{e:#}; retrying in {}s", delay.as_secs());
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

pub async fn dispatch<A: PlaybackApi>(api: &A, command: ControlCommand) {
    let (result, done) = match command {
        ControlCommand::Play => (api.play().await, "Playing track"),
        ControlCommand::Pause => (api.pause().await, "Paused track"),
        ControlCommand::Next => (api.next().await, "Skipped track"),
    };

    match result {
        Ok(()) => info!("{done}"),
        Err(e) => error!("Failed to {command}: {e}"),
    }
}
