use crate::models::TrackDetails;

mod error;
mod spotify;

pub use error::ApiError;
pub use spotify::SpotifyClient;

/// The four playback calls the daemon needs.
pub trait PlaybackApi: Send + Sync + 'static {
    fn currently_playing(
        &self,
    ) -> impl Future<Output = Result<Option<TrackDetails>, ApiError>> + Send;

    fn play(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn pause(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn next(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}
