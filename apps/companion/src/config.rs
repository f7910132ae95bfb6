use std::path::PathBuf;

use anyhow::{Context, Result};
use uuid::Uuid;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_STATE_FILE: &str = ".radar-companion/state.json";

/// Companion settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct CompanionConfig {
    /// Base of the API routes, e.g. `http://localhost:8080/api`.
    pub api_url: String,
    pub state_file: PathBuf,
    /// Owner stamped on every capture. Without it the companion stays unauthenticated.
    pub user_id: Option<Uuid>,
    pub default_project: Option<Uuid>,
    pub rust_log: String,
}

impl CompanionConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(CompanionConfig {
            api_url: std::env::var("RADAR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            state_file: std::env::var("RADAR_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE)),
            user_id: optional_uuid("RADAR_USER_ID")?,
            default_project: optional_uuid("RADAR_PROJECT_ID")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// `/health` lives beside `/api`, not under it.
    pub fn health_url(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        let root = base.strip_suffix("/api").unwrap_or(base);
        format!("{root}/health")
    }
}

fn optional_uuid(key: &str) -> Result<Option<Uuid>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<Uuid>()
            .map(Some)
            .with_context(|| format!("{key} must be a UUID")),
        _ => Ok(None),
    }
}
