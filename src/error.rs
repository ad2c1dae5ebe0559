//! Error taxonomy shared by the token manager, the playback source and the
//! lyrics service. The engine turns every one of these into an error update.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials stored yet (`auth set` has not been run).
    #[error("not authenticated; run `lyricterm auth set` first")]
    NotConfigured,
    #[error("no refresh token available")]
    NoRefreshToken,
    #[error("token refresh rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("token request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("failed to parse token response: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to persist credentials: {0:#}")]
    Persist(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("failed to get currently playing track: {0}")]
    Network(#[source] reqwest::Error),
    #[error("player API request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse player response: {0}")]
    Parse(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("no lyrics found for {title} by {artist}")]
    NotFound { title: String, artist: String },
    #[error("failed to get lyrics: {0}")]
    Network(String),
    #[error("failed to parse lyrics response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LyricsError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for LyricsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
