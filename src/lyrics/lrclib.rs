//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API that provides synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use super::LyricsProvider;
use crate::config::HttpConfig;
use crate::error::LyricsError;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

/// One search candidate as returned by `/api/search`
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LrclibRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub instrumental: bool,
    pub synced_lyrics: Option<String>,
}

/// Return the first result that has synced lyrics, or the first result.
pub fn select_candidate(records: &[LrclibRecord]) -> Option<&LrclibRecord> {
    records
        .iter()
        .find(|r| r.synced_lyrics.is_some())
        .or_else(|| records.first())
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    pub fn new(http: &HttpConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(http.user_agent.as_str())
            .timeout(http.timeout())
            .build()
            .context("build lrclib http client")?;
        Ok(Self {
            client,
            base_url: http.lrclib_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LyricsProvider for LrclibClient {
    async fn search(&self, title: &str, artist: &str) -> Result<Vec<LrclibRecord>, LyricsError> {
        let url = format!(
            "{}/search?track_name={}&artist_name={}",
            self.base_url,
            urlencoding::encode(title),
            urlencoding::encode(artist)
        );
        tracing::debug!(%url, "lrclib search");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LyricsError::Network(format!(
                "LRCLIB search error: {status}: {body}"
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, synced: Option<&str>) -> LrclibRecord {
        LrclibRecord {
            id,
            synced_lyrics: synced.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_prefers_synced() {
        let records = vec![record(1, None), record(2, Some("[00:01.00]a")), record(3, Some("[00:02.00]b"))];
        assert_eq!(select_candidate(&records).map(|r| r.id), Some(2));
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let records = vec![record(7, None), record(8, None)];
        assert_eq!(select_candidate(&records).map(|r| r.id), Some(7));
        assert!(select_candidate(&[]).is_none());
    }

    #[test]
    fn test_deserialize_search_response() {
        let body = r#"[{
            "id": 42,
            "name": "Song",
            "trackName": "Song",
            "artistName": "Band",
            "albumName": "Record",
            "duration": 201.0,
            "instrumental": false,
            "plainLyrics": "Hello",
            "syncedLyrics": "[00:01.00]Hello"
        }, {
            "id": 43,
            "trackName": "Song (Live)",
            "artistName": "Band",
            "plainLyrics": null,
            "syncedLyrics": null
        }]"#;
        let records: Vec<LrclibRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].artist_name.as_deref(), Some("Band"));
        assert_eq!(records[0].synced_lyrics.as_deref(), Some("[00:01.00]Hello"));
        assert!(!records[0].instrumental);
        assert!(records[1].synced_lyrics.is_none());
        assert!(records[1].name.is_none());
    }
}
