use serde::Deserialize;

/// One sample of playback state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub progress_ms: u64,
    pub title: String,
    /// Artist names joined with ", "
    pub artist: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    pub item: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackItem {
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    pub album: Option<NamedObject>,
    #[serde(default)]
    pub artists: Vec<NamedObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedObject {
    pub name: String,
}

impl CurrentlyPlayingResponse {
    /// `None` when nothing track-like is playing (e.g. an ad or a podcast gap).
    pub fn into_snapshot(self) -> Option<PlaybackSnapshot> {
        let item = self.item?;
        let artists: Vec<String> = item.artists.into_iter().map(|a| a.name).collect();
        Some(PlaybackSnapshot {
            is_playing: self.is_playing,
            progress_ms: self.progress_ms.unwrap_or(0),
            title: item.name,
            artist: artists.join(", "),
            artists,
            album: item.album.map(|a| a.name).unwrap_or_default(),
            duration_ms: item.duration_ms,
        })
    }
}

/// Token endpoint reply
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

fn bearer() -> String {
    "Bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currently_playing_to_snapshot() {
        let body = r#"{
            "is_playing": true,
            "progress_ms": 42000,
            "item": {
                "name": "Song",
                "duration_ms": 200000,
                "album": { "name": "Record" },
                "artists": [{ "name": "A" }, { "name": "B" }]
            }
        }"#;
        let resp: CurrentlyPlayingResponse = serde_json::from_str(body).unwrap();
        let snap = resp.into_snapshot().unwrap();
        assert!(snap.is_playing);
        assert_eq!(snap.progress_ms, 42000);
        assert_eq!(snap.title, "Song");
        assert_eq!(snap.artist, "A, B");
        assert_eq!(snap.album, "Record");
        assert_eq!(snap.duration_ms, 200000);
    }

    #[test]
    fn test_null_item_is_no_track() {
        let body = r#"{ "is_playing": true, "progress_ms": null, "item": null }"#;
        let resp: CurrentlyPlayingResponse = serde_json::from_str(body).unwrap();
        assert!(resp.into_snapshot().is_none());
    }

    #[test]
    fn test_token_response_without_refresh_token() {
        let body = r#"{"access_token":"abc","token_type":"Bearer","expires_in":3600,"scope":"user-read-currently-playing"}"#;
        let resp: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.access_token, "abc");
        assert!(resp.refresh_token.is_none());
    }
}
