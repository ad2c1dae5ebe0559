use super::models::TokenResponse;
use crate::error::AuthError;
use crate::storage::CredentialStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Unix seconds; zero means the access token was never issued.
    pub expires_at: i64,
    pub scope: String,
}

impl Credentials {
    pub fn is_expired(&self) -> bool {
        is_expired(self.expires_at, now_unix())
    }

    /// `Authorization` header value for API calls.
    pub fn authorization(&self) -> String {
        let kind = if self.token_type.is_empty() {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{} {}", kind, self.access_token)
    }

    fn refreshed(&self, resp: TokenResponse, now: i64) -> Self {
        Self {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            access_token: resp.access_token,
            refresh_token: resp
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| self.refresh_token.clone()),
            token_type: resp.token_type,
            expires_at: now + resp.expires_in,
            scope: resp.scope,
        }
    }
}

/// The boundary second counts as expired, and so does a zero expiry.
pub fn is_expired(expires_at: i64, now: i64) -> bool {
    expires_at == 0 || expires_at <= now
}

pub fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn refresh(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenResponse, AuthError>;
}

/// Owns the credentials and refreshes them on demand.
///
/// The lock is held for the whole refresh, so callers arriving while a
/// refresh is in flight wait for it and reuse its result.
pub struct TokenManager {
    credentials: Mutex<Option<Credentials>>,
    store: Arc<dyn CredentialStore>,
    endpoint: Arc<dyn TokenEndpoint>,
}

impl TokenManager {
    pub fn load(
        store: Arc<dyn CredentialStore>,
        endpoint: Arc<dyn TokenEndpoint>,
    ) -> anyhow::Result<Self> {
        let credentials = store.load()?;
        Ok(Self {
            credentials: Mutex::new(credentials),
            store,
            endpoint,
        })
    }

    pub async fn current(&self) -> Option<Credentials> {
        self.credentials.lock().await.clone()
    }

    /// Replace the credentials and persist them.
    pub async fn store(&self, credentials: Credentials) -> Result<(), AuthError> {
        let mut guard = self.credentials.lock().await;
        self.store.save(&credentials).map_err(AuthError::Persist)?;
        *guard = Some(credentials);
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AuthError> {
        let mut guard = self.credentials.lock().await;
        self.store.clear().map_err(AuthError::Persist)?;
        *guard = None;
        Ok(())
    }

    /// Credentials safe to use for one request, refreshing first if expired.
    pub async fn valid_credentials(&self) -> Result<Credentials, AuthError> {
        let mut guard = self.credentials.lock().await;
        let current = guard.as_ref().ok_or(AuthError::NotConfigured)?;
        if !current.is_expired() {
            return Ok(current.clone());
        }

        tracing::info!("access token expired, refreshing");
        let refreshed = self.refresh(current).await?;
        *guard = Some(refreshed.clone());
        Ok(refreshed)
    }

    /// Refresh regardless of expiry.
    pub async fn force_refresh(&self) -> Result<Credentials, AuthError> {
        let mut guard = self.credentials.lock().await;
        let current = guard.as_ref().ok_or(AuthError::NotConfigured)?;
        let refreshed = self.refresh(current).await?;
        *guard = Some(refreshed.clone());
        Ok(refreshed)
    }

    /// Exchange the refresh token and persist the result.
    pub async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, AuthError> {
        if credentials.refresh_token.is_empty() {
            return Err(AuthError::NoRefreshToken);
        }

        let resp = self
            .endpoint
            .refresh(
                &credentials.client_id,
                &credentials.client_secret,
                &credentials.refresh_token,
            )
            .await?;

        let refreshed = credentials.refreshed(resp, now_unix());
        self.store.save(&refreshed).map_err(AuthError::Persist)?;
        tracing::debug!(expires_at = refreshed.expires_at, "credentials refreshed");
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeEndpoint {
        calls: AtomicUsize,
        new_refresh_token: Option<String>,
    }

    impl FakeEndpoint {
        fn new(new_refresh_token: Option<&str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                new_refresh_token: new_refresh_token.map(str::to_string),
            }
        }
    }

    #[async_trait]
    impl TokenEndpoint for FakeEndpoint {
        async fn refresh(
            &self,
            client_id: &str,
            _client_secret: &str,
            refresh_token: &str,
        ) -> Result<TokenResponse, AuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            assert_eq!(client_id, "id");
            assert!(!refresh_token.is_empty());
            // Keep the refresh in flight long enough for callers to pile up.
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(TokenResponse {
                access_token: format!("access-{n}"),
                token_type: "Bearer".into(),
                expires_in: 3600,
                refresh_token: self.new_refresh_token.clone(),
                scope: "user-read-currently-playing".into(),
            })
        }
    }

    fn expired_creds() -> Credentials {
        Credentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            access_token: "old".into(),
            refresh_token: "refresh-1".into(),
            token_type: "Bearer".into(),
            expires_at: 0,
            scope: String::new(),
        }
    }

    fn manager(
        creds: Option<Credentials>,
        endpoint: Arc<FakeEndpoint>,
    ) -> (TokenManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        if let Some(c) = creds {
            store.save(&c).unwrap();
        }
        let mgr = TokenManager::load(store.clone(), endpoint).unwrap();
        (mgr, store)
    }

    #[test]
    fn test_expiry_boundary() {
        assert!(is_expired(0, 1_000));
        assert!(is_expired(1_000, 1_000));
        assert!(is_expired(999, 1_000));
        assert!(!is_expired(1_001, 1_000));
    }

    #[test]
    fn test_zero_expiry_is_expired() {
        assert!(expired_creds().is_expired());
    }

    #[test]
    fn test_authorization_header() {
        let mut creds = expired_creds();
        assert_eq!(creds.authorization(), "Bearer old");
        creds.token_type.clear();
        assert_eq!(creds.authorization(), "Bearer old");
    }

    #[tokio::test]
    async fn test_refresh_keeps_old_refresh_token() {
        let endpoint = Arc::new(FakeEndpoint::new(None));
        let (mgr, store) = manager(Some(expired_creds()), endpoint.clone());

        let creds = mgr.valid_credentials().await.unwrap();
        assert_eq!(creds.access_token, "access-1");
        assert_eq!(creds.refresh_token, "refresh-1");
        assert_eq!(creds.client_secret, "secret");
        assert!(!creds.is_expired());
        assert_eq!(store.load().unwrap(), Some(creds));
    }

    #[tokio::test]
    async fn test_refresh_takes_new_refresh_token() {
        let endpoint = Arc::new(FakeEndpoint::new(Some("refresh-2")));
        let (mgr, _store) = manager(Some(expired_creds()), endpoint);

        let creds = mgr.force_refresh().await.unwrap();
        assert_eq!(creds.refresh_token, "refresh-2");
    }

    #[tokio::test]
    async fn test_missing_refresh_token() {
        let endpoint = Arc::new(FakeEndpoint::new(None));
        let mut creds = expired_creds();
        creds.refresh_token.clear();
        let (mgr, _store) = manager(Some(creds), endpoint.clone());

        let err = mgr.valid_credentials().await.unwrap_err();
        assert!(matches!(err, AuthError::NoRefreshToken));
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_configured() {
        let endpoint = Arc::new(FakeEndpoint::new(None));
        let (mgr, _store) = manager(None, endpoint);
        assert!(matches!(
            mgr.valid_credentials().await,
            Err(AuthError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_valid_token_is_not_refreshed() {
        let endpoint = Arc::new(FakeEndpoint::new(None));
        let mut creds = expired_creds();
        creds.expires_at = now_unix() + 600;
        let (mgr, _store) = manager(Some(creds.clone()), endpoint.clone());

        assert_eq!(mgr.valid_credentials().await.unwrap(), creds);
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let endpoint = Arc::new(FakeEndpoint::new(None));
        let (mgr, _store) = manager(Some(expired_creds()), endpoint.clone());

        let (a, b, c) = tokio::join!(
            mgr.valid_credentials(),
            mgr.valid_credentials(),
            mgr.valid_credentials()
        );

        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap().access_token, "access-1");
        assert_eq!(b.unwrap().access_token, "access-1");
        assert_eq!(c.unwrap().access_token, "access-1");
    }
}
