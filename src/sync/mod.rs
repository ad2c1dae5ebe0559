//! Lyric synchronization: polls playback, tracks the active lyric line and
//! streams updates to whatever is displaying them.

pub mod engine;
pub mod line;

use crate::error::PlaybackError;
use crate::lyrics::{LyricLine, LyricSet};
use crate::spotify::PlaybackSnapshot;
use async_trait::async_trait;
use std::sync::Arc;

pub use engine::{EngineConfig, LyricStream, SyncEngine};
pub use line::active_line_index;

/// Where the engine samples playback from.
///
/// `Ok(None)` means nothing is playing, which is a state rather than an error.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn current_playback(&self) -> Result<Option<PlaybackSnapshot>, PlaybackError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Polling,
    Streaming,
    Error,
    Terminated,
}

/// One event on the engine's output channel
#[derive(Debug, Clone, Default)]
pub struct LyricUpdate {
    pub lyrics: Option<Arc<LyricSet>>,
    pub line: Option<LyricLine>,
    pub line_index: Option<usize>,
    /// Text ready to print, padded for rendering
    pub text: String,
    pub is_error: bool,
    pub error_message: String,
    /// Nothing is playing; the engine keeps polling
    pub waiting: bool,
}

impl LyricUpdate {
    pub fn line(lyrics: Arc<LyricSet>, index: usize) -> Self {
        let line = lyrics.lines.get(index).cloned();
        let text = line
            .as_ref()
            .map(|l| display_text(&l.text))
            .unwrap_or_default();
        Self {
            lyrics: Some(lyrics),
            line,
            line_index: Some(index),
            text,
            ..Default::default()
        }
    }

    pub fn notice(lyrics: Option<Arc<LyricSet>>, text: impl Into<String>) -> Self {
        Self {
            lyrics,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            error_message: message.into(),
            ..Default::default()
        }
    }

    pub fn waiting() -> Self {
        Self {
            text: "Waiting for a track to play...".to_string(),
            waiting: true,
            ..Default::default()
        }
    }
}

pub fn display_text(text: &str) -> String {
    format!("      {text}      ")
}
