use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

use crate::api::SpotifyClient;
use crate::auth::{self, AuthFlow, Authenticator, Session};
use crate::config::Config;
use crate::daemon::{Daemon, DaemonSettings};
use crate::fifo;
use crate::models::{ControlCommand, OutputFormat};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct App {
    pub config: Config,
}

impl App {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        Ok(Self { config })
    }

    pub async fn run(
        &mut self,
        manual: bool,
        format: Option<OutputFormat>,
        interval: Option<u64>,
    ) -> Result<()> {
        if let Some(format) = format {
            self.config.publisher.format = format;
        }
        if let Some(interval) = interval {
            self.config.publisher.interval_secs = interval;
        }

        let credentials = self.config.credentials()?;
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let authenticator =
            Authenticator::new(http.clone(), credentials, self.config.accounts_url()?);
        let flow = if manual {
            AuthFlow::Manual
        } else {
            AuthFlow::Browser
        };
        let token = auth::authorize(&authenticator, flow)
            .await
            .with_context(|| "Could not authorize with Spotify")?;

        let session = Session::new(authenticator, token);
        let api = SpotifyClient::new(http, self.config.api_url()?, session);

        Daemon::new(api, DaemonSettings::from_config(&self.config))
            .run()
            .await
    }

    pub async fn send(&self, command: ControlCommand) -> Result<()> {
        let pipe = self.config.control_pipe_path();
        if !fifo::is_named_pipe(&pipe) {
            bail!(
                "Control pipe {} not found. Start it with: fifoplayer run",
                pipe.display()
            );
        }

        tokio::time::timeout(SEND_TIMEOUT, fifo::write_message(&pipe, command.as_str()))
            .await
            .with_context(|| format!("Nothing is listening on {}", pipe.display()))?
            .with_context(|| format!("Failed to write to {}", pipe.display()))?;

        println!("Sent {command}");
        Ok(())
    }

    pub async fn status(&self) -> Result<()> {
        let pipe = self.config.track_pipe_path();
        if !fifo::is_named_pipe(&pipe) {
            bail!(
                "Track pipe {} not found. Start it with: fifoplayer run",
                pipe.display()
            );
        }

        let message = tokio::time::timeout(STATUS_TIMEOUT, fifo::read_to_end(&pipe))
            .await
            .with_context(|| format!("Nothing was published on {}", pipe.display()))?
            .with_context(|| format!("Failed to read from {}", pipe.display()))?;

        println!("{}", message.trim_end());
        Ok(())
    }
}
