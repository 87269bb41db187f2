use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{ApiError, PlaybackApi};
use crate::auth::Session;
use crate::models::TrackDetails;

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    progress_ms: Option<u64>,
    item: Option<PlayingItem>,
}

/// A track, or an episode (which has no artists or album).
#[derive(Debug, Deserialize)]
struct PlayingItem {
    name: String,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    artists: Vec<Artist>,
    album: Option<Album>,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Album {
    name: String,
}

impl CurrentlyPlaying {
    fn into_details(self) -> Option<TrackDetails> {
        let item = self.item?;
        Some(TrackDetails::new(
            item.name,
            item.artists.iter().map(|a| a.name.as_str()),
            item.album.map(|a| a.name).unwrap_or_default(),
            self.progress_ms.unwrap_or(0),
            item.duration_ms,
        ))
    }
}

pub struct SpotifyClient {
    http: Client,
    api_url: Url,
    session: Session,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: Url, session: Session) -> Self {
        Self {
            http,
            api_url,
            session,
        }
    }

    async fn send(&self, method: Method, path: &str) -> Result<Response, ApiError> {
        let url = self.api_url.join(path)?;
        let token = self.session.access_token().await?;

        let mut request = self.http.request(method.clone(), url).bearer_auth(token);
        if method != Method::GET {
            request = request.header(CONTENT_LENGTH, 0);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        debug!("{method} {path} -> {status}");
        Ok(response)
    }
}

impl PlaybackApi for SpotifyClient {
    async fn currently_playing(&self) -> Result<Option<TrackDetails>, ApiError> {
        let response = self
            .send(Method::GET, "me/player/currently-playing")
            .await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }

        let playing: CurrentlyPlaying = serde_json::from_slice(&body)?;
        Ok(playing.into_details())
    }

    async fn play(&self) -> Result<(), ApiError> {
        self.send(Method::PUT, "me/player/play").await.map(drop)
    }

    async fn pause(&self) -> Result<(), ApiError> {
        self.send(Method::PUT, "me/player/pause").await.map(drop)
    }

    async fn next(&self) -> Result<(), ApiError> {
        self.send(Method::POST, "me/player/next").await.map(drop)
    }
}
