use super::api::SpotifyClient;
use super::auth::TokenManager;
use super::models::PlaybackSnapshot;
use crate::error::PlaybackError;
use crate::sync::SnapshotSource;
use async_trait::async_trait;
use std::sync::Arc;

/// Playback source backed by the Spotify API with token refresh built in.
#[derive(Clone)]
pub struct SpotifyPlayer {
    client: SpotifyClient,
    tokens: Arc<TokenManager>,
}

impl SpotifyPlayer {
    pub fn new(client: SpotifyClient, tokens: Arc<TokenManager>) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl SnapshotSource for SpotifyPlayer {
    async fn current_playback(&self) -> Result<Option<PlaybackSnapshot>, PlaybackError> {
        let creds = self.tokens.valid_credentials().await?;
        self.client.currently_playing(&creds).await
    }
}
