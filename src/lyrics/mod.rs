//! Lyrics module for fetching and caching synchronized lyrics
//!
//! This module provides:
//! - LRCLIB API client for fetching lyrics
//! - LRC format parser for synchronized lyrics
//! - A session cache keyed by artist and title

pub mod lrclib;
pub mod parser;

use crate::error::LyricsError;
use async_trait::async_trait;
use lrclib::{select_candidate, LrclibRecord};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub use lrclib::LrclibClient;
pub use parser::LyricLine;

/// Parsed lyrics for one track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricSet {
    pub id: i64,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub language: String,
    /// Whether the lines carry timing
    pub synced: bool,
    pub instrumental: bool,
    pub lines: Vec<LyricLine>,
}

impl LyricSet {
    fn from_record(record: &LrclibRecord, artist: &str, title: &str, album: &str) -> Self {
        let lines = record
            .synced_lyrics
            .as_deref()
            .map(parser::parse_lrc)
            .unwrap_or_default();

        Self {
            id: record.id,
            name: record
                .name
                .clone()
                .or_else(|| record.track_name.clone())
                .unwrap_or_else(|| title.to_string()),
            artist: record.artist_name.clone().unwrap_or_else(|| artist.to_string()),
            album: record.album_name.clone().unwrap_or_else(|| album.to_string()),
            language: String::new(),
            synced: record.synced_lyrics.is_some(),
            instrumental: record.instrumental,
            lines,
        }
    }
}

/// Something that can search a lyric database by track and artist name.
#[async_trait]
pub trait LyricsProvider: Send + Sync {
    async fn search(&self, title: &str, artist: &str) -> Result<Vec<LrclibRecord>, LyricsError>;
}

/// Lyrics lookup with a process-lifetime cache in front of the provider.
pub struct LyricsService {
    provider: Arc<dyn LyricsProvider>,
    cache: RwLock<HashMap<String, Arc<LyricSet>>>,
}

impl LyricsService {
    pub fn new(provider: Arc<dyn LyricsProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Get lyrics for a track, hitting the provider only on a cache miss.
    ///
    /// Album is accepted for display but is not part of the cache key.
    pub async fn get_lyrics(
        &self,
        artist: &str,
        title: &str,
        album: &str,
    ) -> Result<Arc<LyricSet>, LyricsError> {
        let key = cache_key(artist, title);

        let cached = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned();
        if let Some(hit) = cached {
            tracing::debug!(%key, "lyrics cache hit");
            return Ok(hit);
        }

        let records = self.provider.search(title, artist).await?;
        let Some(record) = select_candidate(&records) else {
            return Err(LyricsError::NotFound {
                title: title.to_string(),
                artist: artist.to_string(),
            });
        };

        let set = Arc::new(LyricSet::from_record(record, artist, title, album));
        tracing::info!(
            %key,
            synced = set.synced,
            lines = set.lines.len(),
            "lyrics fetched"
        );

        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, Arc::clone(&set));

        Ok(set)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

fn cache_key(artist: &str, title: &str) -> String {
    format!("{artist}|{title}")
}
