use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::captures::enrichment::CaptureAnalyzer;
use crate::cohorts::session::CohortSessions;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Brief export archive.
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Truth analysis backend. Default: `LlmCaptureAnalyzer`.
    pub analyzer: Arc<dyn CaptureAnalyzer>,
    /// Redis-backed Cohort Builder sessions.
    pub cohorts: CohortSessions,
}
