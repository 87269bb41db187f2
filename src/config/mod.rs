use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::auth::Credentials;
use crate::models::OutputFormat;

pub const ENV_CLIENT_ID: &str = "SPOTIFY_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_SECRET";
pub const ENV_REDIRECT_URI: &str = "SPOTIFY_REDIRECT";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub pipes: PipesConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub accounts_url: String,
    pub api_url: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            accounts_url: "https://accounts.spotify.com/".to_string(),
            api_url: "https://api.spotify.com/v1/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipesConfig {
    pub dir: PathBuf,
    pub track: String,
    pub control: String,
}

impl Default for PipesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/tmp"),
            track: "fifoplayer-track".to_string(),
            control: "fifoplayer-control".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub interval_secs: u64,
    pub format: OutputFormat,
    pub max_backoff_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3,
            format: OutputFormat::Line,
            max_backoff_secs: 60,
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fifoplayer")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        let mut config = Self::from_file(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| "Failed to parse config file")?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let spotify = &mut self.spotify;
        for (key, slot) in [
            (ENV_CLIENT_ID, &mut spotify.client_id),
            (ENV_CLIENT_SECRET, &mut spotify.client_secret),
            (ENV_REDIRECT_URI, &mut spotify.redirect_uri),
        ] {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        let spotify = &self.spotify;
        let client_id = present(&spotify.client_id);
        let client_secret = present(&spotify.client_secret);
        let redirect_uri = present(&spotify.redirect_uri);

        let missing: Vec<&str> = [
            (client_id.is_none(), ENV_CLIENT_ID),
            (client_secret.is_none(), ENV_CLIENT_SECRET),
            (redirect_uri.is_none(), ENV_REDIRECT_URI),
        ]
        .into_iter()
        .filter_map(|(absent, key)| absent.then_some(key))
        .collect();

        let (Some(client_id), Some(client_secret), Some(redirect_uri)) =
            (client_id, client_secret, redirect_uri)
        else {
            bail!(
                "Missing {} (set them in the environment or in {})",
                missing.join(", "),
                Self::config_path().display()
            );
        };

        let redirect_uri = Url::parse(redirect_uri)
            .with_context(|| format!("Invalid redirect URL: {redirect_uri}"))?;

        Ok(Credentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri,
        })
    }

    pub fn accounts_url(&self) -> Result<Url> {
        base_url(&self.spotify.accounts_url)
    }

    pub fn api_url(&self) -> Result<Url> {
        base_url(&self.spotify.api_url)
    }

    pub fn track_pipe_path(&self) -> PathBuf {
        self.pipes.dir.join(&self.pipes.track)
    }

    pub fn control_pipe_path(&self) -> PathBuf {
        self.pipes.dir.join(&self.pipes.control)
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_secs(self.publisher.interval_secs.max(1))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.publisher.max_backoff_secs).max(self.publish_interval())
    }
}

fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("Invalid base URL: {raw}"))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
