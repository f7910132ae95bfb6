use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::captures::models::{Capture, CaptureStatus, CaptureType, DsdSection};
use crate::errors::AppError;
use crate::models::capture::CaptureRow;

/// Persistence seam for the tagging and enrichment flows.
///
/// Each save writes only its own column group, so concurrent edits to
/// different groups of the same capture do not clobber each other.
#[async_trait]
pub trait CaptureStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Capture>, AppError>;

    /// Writes `dsd_tags` and `dsd_section`.
    async fn save_tagging(&self, capture: &Capture) -> Result<(), AppError>;

    async fn set_status(&self, id: Uuid, status: CaptureStatus) -> Result<(), AppError>;

    /// Writes the enrichment fields and the status. `suggested` only fills a
    /// section that is still empty at write time. Returns the stored section.
    async fn save_analysis(
        &self,
        capture: &Capture,
        suggested: Option<DsdSection>,
    ) -> Result<Option<DsdSection>, AppError>;
}

#[derive(Clone)]
pub struct PgCaptureStore {
    pool: PgPool,
}

impl PgCaptureStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaptureStore for PgCaptureStore {
    async fn find(&self, id: Uuid) -> Result<Option<Capture>, AppError> {
        get_capture(&self.pool, id).await
    }

    async fn save_tagging(&self, capture: &Capture) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE captures
            SET dsd_tags = $1, dsd_section = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(Json(&capture.dsd_tags))
        .bind(capture.dsd_section.map(|s| s.as_str()))
        .bind(capture.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: CaptureStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE captures SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_analysis(
        &self,
        capture: &Capture,
        suggested: Option<DsdSection>,
    ) -> Result<Option<DsdSection>, AppError> {
        let stored: Option<Option<String>> = sqlx::query_scalar(
            r#"
            UPDATE captures
            SET truth_analysis = $1, summary = $2, viral_score = $3,
                cultural_relevance = $4, dsd_section = COALESCE(dsd_section, $5),
                status = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING dsd_section
            "#,
        )
        .bind(capture.truth_analysis.as_ref().map(Json))
        .bind(&capture.summary)
        .bind(capture.viral_score)
        .bind(capture.cultural_relevance)
        .bind(suggested.map(|s| s.as_str()))
        .bind(capture.status.as_str())
        .bind(capture.id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(section) = stored.flatten() else {
            return Ok(None);
        };
        section
            .parse::<DsdSection>()
            .map(Some)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("capture {}: {e}", capture.id)))
    }
}

/// Parameters for inserting a new capture.
pub struct NewCapture<'a> {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub capture_type: CaptureType,
    pub platform: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub source_url: Option<&'a str>,
    pub screenshot_ref: Option<&'a str>,
    pub user_note: Option<&'a str>,
    pub tags: &'a [String],
}

/// Inserts a capture with no tags, no section and status `pending`.
pub async fn insert_capture(pool: &PgPool, new: NewCapture<'_>) -> Result<Capture, AppError> {
    let row = sqlx::query_as::<_, CaptureRow>(
        r#"
        INSERT INTO captures
            (id, project_id, user_id, capture_type, platform, title, content,
             source_url, screenshot_ref, user_note, tags, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.project_id)
    .bind(new.user_id)
    .bind(new.capture_type.as_str())
    .bind(new.platform)
    .bind(new.title)
    .bind(new.content)
    .bind(new.source_url)
    .bind(new.screenshot_ref)
    .bind(new.user_note)
    .bind(new.tags)
    .fetch_one(pool)
    .await?;
    row.try_into()
}

pub async fn get_capture(pool: &PgPool, id: Uuid) -> Result<Option<Capture>, AppError> {
    sqlx::query_as::<_, CaptureRow>("SELECT * FROM captures WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Capture::try_from)
        .transpose()
}

/// All captures of a project in created-at order.
pub async fn list_for_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Capture>, AppError> {
    sqlx::query_as::<_, CaptureRow>(
        "SELECT * FROM captures WHERE project_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Capture::try_from)
    .collect()
}

/// Newest captures across every project owned by the user.
pub async fn list_recent_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<Capture>, AppError> {
    sqlx::query_as::<_, CaptureRow>(
        r#"
        SELECT c.*
        FROM captures c
        JOIN projects p ON p.id = c.project_id
        WHERE p.user_id = $1
        ORDER BY c.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Capture::try_from)
    .collect()
}

/// Pending captures across every project the user owns, oldest first.
pub async fn list_pending_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Capture>, AppError> {
    sqlx::query_as::<_, CaptureRow>(
        r#"
        SELECT c.*
        FROM captures c
        JOIN projects p ON p.id = c.project_id
        WHERE p.user_id = $1 AND c.status = 'pending'
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Capture::try_from)
    .collect()
}

/// Writes the user-editable descriptive fields.
pub async fn save_details(pool: &PgPool, capture: &Capture) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE captures
        SET title = $1, content = $2, user_note = $3, workspace_notes = $4,
            tags = $5, summary = $6, updated_at = NOW()
        WHERE id = $7
        "#,
    )
    .bind(&capture.title)
    .bind(&capture.content)
    .bind(&capture.user_note)
    .bind(&capture.workspace_notes)
    .bind(&capture.tags)
    .bind(&capture.summary)
    .bind(capture.id)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use super::*;

    /// In-memory store. Saves for ids in `failing` return a database error.
    #[derive(Default)]
    pub struct MemoryCaptureStore {
        pub captures: Mutex<HashMap<Uuid, Capture>>,
        pub failing: HashSet<Uuid>,
    }

    impl MemoryCaptureStore {
        pub fn with(captures: Vec<Capture>) -> Self {
            Self {
                captures: Mutex::new(captures.into_iter().map(|c| (c.id, c)).collect()),
                failing: HashSet::new(),
            }
        }

        pub fn get(&self, id: Uuid) -> Capture {
            self.captures.lock().unwrap()[&id].clone()
        }

        fn check(&self, id: Uuid) -> Result<(), AppError> {
            if self.failing.contains(&id) {
                return Err(AppError::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CaptureStore for MemoryCaptureStore {
        async fn find(&self, id: Uuid) -> Result<Option<Capture>, AppError> {
            Ok(self.captures.lock().unwrap().get(&id).cloned())
        }

        async fn save_tagging(&self, capture: &Capture) -> Result<(), AppError> {
            self.check(capture.id)?;
            let mut map = self.captures.lock().unwrap();
            if let Some(stored) = map.get_mut(&capture.id) {
                stored.dsd_tags = capture.dsd_tags.clone();
                stored.dsd_section = capture.dsd_section;
            }
            Ok(())
        }

        async fn set_status(&self, id: Uuid, status: CaptureStatus) -> Result<(), AppError> {
            if let Some(stored) = self.captures.lock().unwrap().get_mut(&id) {
                stored.status = status;
            }
            Ok(())
        }

        async fn save_analysis(
            &self,
            capture: &Capture,
            suggested: Option<DsdSection>,
        ) -> Result<Option<DsdSection>, AppError> {
            self.check(capture.id)?;
            let mut map = self.captures.lock().unwrap();
            let Some(stored) = map.get_mut(&capture.id) else {
                return Ok(None);
            };
            stored.truth_analysis = capture.truth_analysis.clone();
            stored.summary = capture.summary.clone();
            stored.viral_score = capture.viral_score;
            stored.cultural_relevance = capture.cultural_relevance;
            stored.status = capture.status;
            stored.dsd_section = stored.dsd_section.or(suggested);
            Ok(stored.dsd_section)
        }
    }
}
