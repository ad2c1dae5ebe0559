use super::auth::{Credentials, TokenEndpoint};
use super::models::{CurrentlyPlayingResponse, PlaybackSnapshot, TokenResponse};
use crate::config::HttpConfig;
use crate::error::{AuthError, PlaybackError};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    api_base: String,
    accounts_base: String,
}

/// Thin client over the two Spotify endpoints this app needs.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    inner: Arc<Inner>,
}

impl SpotifyClient {
    pub fn new(cfg: &HttpConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(cfg.timeout())
            .build()
            .context("build spotify http client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                api_base: cfg.api_base_url.trim_end_matches('/').to_string(),
                accounts_base: cfg.accounts_base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Currently playing track, or `None` when nothing is playing.
    pub async fn currently_playing(
        &self,
        creds: &Credentials,
    ) -> Result<Option<PlaybackSnapshot>, PlaybackError> {
        let url = format!("{}/me/player/currently-playing", self.inner.api_base);
        let resp = self
            .inner
            .http
            .get(&url)
            .header(AUTHORIZATION, creds.authorization())
            .send()
            .await
            .map_err(PlaybackError::Network)?;

        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = resp.text().await.map_err(PlaybackError::Network)?;
        if !status.is_success() {
            return Err(PlaybackError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CurrentlyPlayingResponse =
            serde_json::from_str(&body).map_err(PlaybackError::Parse)?;
        Ok(parsed.into_snapshot())
    }
}

#[async_trait]
impl TokenEndpoint for SpotifyClient {
    async fn refresh(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenResponse, AuthError> {
        let url = format!("{}/api/token", self.inner.accounts_base);
        let form = format!(
            "grant_type=refresh_token&refresh_token={}",
            urlencoding::encode(refresh_token)
        );

        let resp = self
            .inner
            .http
            .post(&url)
            .basic_auth(client_id, Some(client_secret))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(AuthError::Network)?;

        let status = resp.status();
        let body = resp.text().await.map_err(AuthError::Network)?;
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(AuthError::Parse)
    }
}
