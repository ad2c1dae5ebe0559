use crate::spotify::auth::Credentials;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Durable home for the credentials the token manager owns.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Option<Credentials>>;
    fn save(&self, credentials: &Credentials) -> anyhow::Result<()>;
    fn clear(&self) -> anyhow::Result<()>;
}

/// Credentials kept as a single pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for Storage {
    fn load(&self) -> anyhow::Result<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let creds = serde_json::from_str(&raw)
            .with_context(|| format!("parse {}", self.path.display()))?;
        Ok(Some(creds))
    }

    fn save(&self, credentials: &Credentials) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(credentials).context("serialize credentials")?;
        crate::config::write_private(&self.path, &raw)
    }

    fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", self.path.display())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// In-memory store recording every save.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub saved: Mutex<Vec<Credentials>>,
    }

    impl CredentialStore for MemoryStore {
        fn load(&self) -> anyhow::Result<Option<Credentials>> {
            Ok(self.saved.lock().unwrap().last().cloned())
        }

        fn save(&self, credentials: &Credentials) -> anyhow::Result<()> {
            self.saved.lock().unwrap().push(credentials.clone());
            Ok(())
        }

        fn clear(&self) -> anyhow::Result<()> {
            self.saved.lock().unwrap().clear();
            Ok(())
        }
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let dir = std::env::temp_dir().join(format!("lyricterm-store-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let store = Storage::open(&dir.join("credentials.json"));

        assert!(store.load().unwrap().is_none());

        let creds = Credentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: "refresh".into(),
            ..Default::default()
        };
        store.save(&creds).unwrap();
        assert_eq!(store.load().unwrap(), Some(creds));

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
