use crate::lyrics::LyricSet;
use crate::sync::LyricUpdate;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Waiting(String),
    Notice(String),
    Error(String),
}

/// What the lyric view shows, folded from the update stream.
#[derive(Debug, Default)]
pub struct ViewState {
    pub lyrics: Option<Arc<LyricSet>>,
    pub active: Option<usize>,
    pub status: Option<Status>,
    /// Mirror file trouble; shown when the status line is otherwise free.
    pub mirror_warning: Option<String>,
    pub should_quit: bool,
}

impl ViewState {
    pub fn apply(&mut self, update: LyricUpdate) {
        if update.is_error {
            // Keep the last lyrics on screen; the error goes in the status line.
            self.status = Some(Status::Error(update.error_message));
            return;
        }
        if update.waiting {
            self.lyrics = None;
            self.active = None;
            self.status = Some(Status::Waiting(update.text));
            return;
        }

        if update.lyrics.is_some() {
            self.lyrics = update.lyrics;
        }
        self.active = update.line_index;
        self.status = match update.line_index {
            Some(_) => None,
            None => Some(Status::Notice(update.text)),
        };
    }

    /// `artist - name` of the loaded lyrics.
    pub fn title(&self) -> Option<String> {
        self.lyrics
            .as_ref()
            .map(|set| format!("{} - {}", set.artist, set.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::LyricLine;

    fn set() -> Arc<LyricSet> {
        Arc::new(LyricSet {
            name: "Song".into(),
            artist: "Band".into(),
            lines: vec![LyricLine::new(0, 1000, "one"), LyricLine::new(1000, 6000, "two")],
            ..Default::default()
        })
    }

    #[test]
    fn test_line_update_clears_status() {
        let mut state = ViewState {
            status: Some(Status::Error("old".into())),
            ..Default::default()
        };
        state.apply(LyricUpdate::line(set(), 1));
        assert_eq!(state.active, Some(1));
        assert_eq!(state.status, None);
        assert_eq!(state.title().as_deref(), Some("Band - Song"));
    }

    #[test]
    fn test_error_keeps_lyrics() {
        let mut state = ViewState::default();
        state.apply(LyricUpdate::line(set(), 0));
        state.apply(LyricUpdate::error("Error getting track: timeout"));
        assert!(state.lyrics.is_some());
        assert_eq!(state.active, Some(0));
        assert_eq!(
            state.status,
            Some(Status::Error("Error getting track: timeout".into()))
        );
    }

    #[test]
    fn test_waiting_clears_lyrics() {
        let mut state = ViewState::default();
        state.apply(LyricUpdate::line(set(), 0));
        state.apply(LyricUpdate::waiting());
        assert!(state.lyrics.is_none());
        assert!(matches!(state.status, Some(Status::Waiting(_))));
        assert_eq!(state.title(), None);
    }

    #[test]
    fn test_notice_without_line() {
        let mut state = ViewState::default();
        state.apply(LyricUpdate::notice(Some(set()), "No lyrics to display."));
        assert_eq!(state.active, None);
        assert_eq!(state.status, Some(Status::Notice("No lyrics to display.".into())));
    }
}
