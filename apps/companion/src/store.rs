//! JSON file holding the companion state between runs.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use crate::state::CompanionState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file starts a fresh session.
    pub async fn load(&self) -> Result<CompanionState, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state at {}, starting a new session", self.path.display());
                Ok(CompanionState::new(Utc::now()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file then renames, so a crash never leaves half a file.
    pub async fn save(&self, state: &CompanionState) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(state)?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::payload;
    use crate::state::CaptureMode;

    #[tokio::test]
    async fn test_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));

        let state = file.load().await.unwrap();
        assert!(state.recent_captures.is_empty());
        assert!(!state.is_authenticated);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("nested").join("state.json"));

        let mut state = CompanionState::new(Utc::now());
        state.capture_mode = CaptureMode::Context;
        state.record_capture(payload("queued"), false, Utc::now());
        file.save(&state).await.unwrap();

        let loaded = file.load().await.unwrap();
        assert_eq!(loaded, state);
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{not json").unwrap();

        let result = StateFile::new(path).load().await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
