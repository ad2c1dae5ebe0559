//! Mirrors the active lyric line into a plain file so status bars and
//! desktop widgets can pick it up.

use crate::config::OutputConfig;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct LyricMirror {
    path: PathBuf,
    enabled: bool,
    /// Set while writes keep failing, so the user is told once per outage.
    failing: AtomicBool,
}

impl LyricMirror {
    pub fn new(cfg: &OutputConfig) -> Self {
        Self {
            path: cfg.mirror_file.clone(),
            enabled: cfg.mirror_enabled,
            failing: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the mirror file with `text`. No-op when disabled.
    pub async fn write(&self, text: &str) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        tokio::fs::write(&self.path, text)
            .await
            .with_context(|| format!("write lyric mirror {}", self.path.display()))
    }

    /// Like [`write`](Self::write) but never fails; display must go on.
    ///
    /// Every failure is logged. The first failure after a good write is also
    /// returned as a message for the user.
    pub async fn publish(&self, text: &str) -> Option<String> {
        match self.write(text).await {
            Ok(()) => {
                self.failing.store(false, Ordering::Relaxed);
                None
            }
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "lyric mirror write failed");
                if self.failing.swap(true, Ordering::Relaxed) {
                    None
                } else {
                    Some(format!("Error writing to file: {e:#}"))
                }
            }
        }
    }
}
