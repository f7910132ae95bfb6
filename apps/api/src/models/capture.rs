use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::captures::models::{Capture, DsdTags, TruthAnalysis};
use crate::errors::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct CaptureRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub capture_type: String,
    pub platform: String,
    pub title: String,
    pub content: String,
    pub source_url: Option<String>,
    pub screenshot_ref: Option<String>,
    pub user_note: Option<String>,
    pub workspace_notes: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub dsd_tags: Json<DsdTags>,
    pub dsd_section: Option<String>,
    pub truth_analysis: Option<Json<TruthAnalysis>>,
    pub viral_score: Option<f64>,
    pub cultural_relevance: Option<f64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CaptureRow> for Capture {
    type Error = AppError;

    fn try_from(row: CaptureRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = move |e: String| AppError::Internal(anyhow::anyhow!("capture {id}: {e}"));
        Ok(Capture {
            id: row.id,
            project_id: row.project_id,
            user_id: row.user_id,
            capture_type: row.capture_type.parse().map_err(corrupt)?,
            platform: row.platform,
            title: row.title,
            content: row.content,
            source_url: row.source_url,
            screenshot_ref: row.screenshot_ref,
            user_note: row.user_note,
            workspace_notes: row.workspace_notes,
            summary: row.summary,
            tags: row.tags,
            dsd_tags: row.dsd_tags.0,
            dsd_section: row
                .dsd_section
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(corrupt)?,
            truth_analysis: row.truth_analysis.map(|j| j.0),
            viral_score: row.viral_score,
            cultural_relevance: row.cultural_relevance,
            status: row.status.parse().map_err(corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
