use reqwest::StatusCode;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::Mutex;

use crate::api::{ApiError, PlaybackApi};
use crate::models::TrackDetails;

#[derive(Default)]
pub struct RecordingApi {
    pub playing: Mutex<Option<TrackDetails>>,
    pub calls: Mutex<Vec<&'static str>>,
    pub fail: Mutex<bool>,
    pub panic_on_fetch: Mutex<bool>,
}

impl RecordingApi {
    pub fn playing(details: TrackDetails) -> Self {
        let api = Self::default();
        *api.playing.lock().unwrap() = Some(details);
        api
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if *self.fail.lock().unwrap() {
            return Err(ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "try later".to_string(),
            });
        }
        Ok(())
    }
}

impl PlaybackApi for RecordingApi {
    async fn currently_playing(&self) -> Result<Option<TrackDetails>, ApiError> {
        let panics = *self.panic_on_fetch.lock().unwrap();
        if panics {
            panic!("player went away");
        }
        self.record("currently_playing")?;
        Ok(self.playing.lock().unwrap().clone())
    }

    async fn play(&self) -> Result<(), ApiError> {
        self.record("play")
    }

    async fn pause(&self) -> Result<(), ApiError> {
        self.record("pause")
    }

    async fn next(&self) -> Result<(), ApiError> {
        self.record("next")
    }
}

pub fn release_pipe(path: &Path) {
    let _ = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path);
    let _ = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path);
}
