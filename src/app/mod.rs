pub mod actions;
pub mod events;
pub mod pipe;
pub mod show;
pub mod state;

use crate::config::Config;
use crate::lyrics::{LrclibClient, LyricsService};
use crate::output::LyricMirror;
use crate::spotify::{SpotifyClient, SpotifyPlayer, TokenManager};
use crate::storage::Storage;
use crate::sync::{EngineConfig, LyricUpdate, SyncEngine};
use std::sync::Arc;

/// Everything a command needs, built once in `main`.
pub struct AppContext {
    pub cfg: Config,
    pub spotify: SpotifyClient,
    pub tokens: Arc<TokenManager>,
    pub lyrics: Arc<LyricsService>,
    pub mirror: LyricMirror,
}

impl AppContext {
    pub fn new(cfg: Config) -> anyhow::Result<Self> {
        let spotify = SpotifyClient::new(&cfg.http)?;
        let store = Arc::new(Storage::open(&cfg.paths.credentials_file()));
        let tokens = Arc::new(TokenManager::load(store, Arc::new(spotify.clone()))?);
        let lyrics = Arc::new(LyricsService::new(Arc::new(LrclibClient::new(&cfg.http)?)));
        let mirror = LyricMirror::new(&cfg.output);

        Ok(Self {
            cfg,
            spotify,
            tokens,
            lyrics,
            mirror,
        })
    }

    pub fn player(&self) -> SpotifyPlayer {
        SpotifyPlayer::new(self.spotify.clone(), Arc::clone(&self.tokens))
    }

    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(
            Arc::new(self.player()),
            Arc::clone(&self.lyrics),
            EngineConfig::from(&self.cfg.sync),
        )
    }
}

/// Text worth mirroring for an update, if any.
pub(crate) fn mirror_text(update: &LyricUpdate) -> Option<&str> {
    if update.is_error || update.text.trim().is_empty() {
        return None;
    }
    Some(update.text.as_str())
}
