//! Axum route handlers for the Captures API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::captures::bulk::{bulk_update, BulkOutcome};
use crate::captures::enrichment::{analyze_batch, analyze_capture, analyze_pending, BatchReport};
use crate::captures::filter::{filter_captures, sort_captures, CaptureFilter, CaptureSort, Choice};
use crate::captures::models::{Capture, CaptureType, DsdSection, DsdTag, DsdTagPatch};
use crate::captures::store::{self, CaptureStore, NewCapture, PgCaptureStore};
use crate::captures::suggest::suggest_tags;
use crate::captures::tagging::{
    apply_patch, assign_section, merge_tags, section_is_consistent, set_tag, TaggingPatch,
};
use crate::errors::AppError;
use crate::models::{double_option, UserQuery};
use crate::projects::store::{owned_project_ids, require_owned};
use crate::state::AppState;

const DEFAULT_RECENT_LIMIT: i64 = 10;
const MAX_RECENT_LIMIT: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaptureRequest {
    pub user_id: Uuid,
    pub project_id: Uuid,
    #[serde(rename = "type", default)]
    pub capture_type: Option<CaptureType>,
    pub platform: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub source_url: Option<String>,
    pub screenshot_ref: Option<String>,
    pub user_note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCapturesQuery {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub search: Option<String>,
    pub platform: Option<String>,
    pub section: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<CaptureSort>,
}

impl ListCapturesQuery {
    fn filter(&self) -> Result<CaptureFilter, AppError> {
        Ok(CaptureFilter {
            search: self.search.clone().unwrap_or_default(),
            platform: Choice::text(self.platform.as_deref()),
            section: Choice::parse(self.section.as_deref()).map_err(AppError::Validation)?,
            tag: Choice::text(self.tag.as_deref()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

/// PATCH body: descriptive fields plus the tagging patch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_note: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub workspace_notes: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub summary: Option<Option<String>>,
    #[serde(flatten)]
    pub tagging: TaggingPatch,
}

impl CaptureUpdate {
    fn touches_details(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.user_note.is_some()
            || self.workspace_notes.is_some()
            || self.tags.is_some()
            || self.summary.is_some()
    }

    /// Copies the descriptive fields onto the capture, then applies the tagging patch.
    fn apply(self, capture: &mut Capture) {
        if let Some(title) = self.title {
            capture.title = title.trim().to_string();
        }
        if let Some(content) = self.content {
            capture.content = content;
        }
        if let Some(note) = self.user_note {
            capture.user_note = note;
        }
        if let Some(notes) = self.workspace_notes {
            capture.workspace_notes = notes;
        }
        if let Some(tags) = self.tags {
            capture.tags = tags;
        }
        if let Some(summary) = self.summary {
            capture.summary = summary;
        }
        apply_patch(capture, &self.tagging);
    }
}

#[derive(Debug, Deserialize)]
pub struct SetTagRequest {
    pub value: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignSectionRequest {
    pub section: DsdSection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest {
    pub capture_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub patch: TaggingPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBatchRequest {
    pub capture_ids: Vec<Uuid>,
}

/// A capture after a tagging change, with the soft section/tag consistency check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggingResponse {
    pub capture: Capture,
    pub section_consistent: bool,
}

impl From<Capture> for TaggingResponse {
    fn from(capture: Capture) -> Self {
        let section_consistent = section_is_consistent(&capture);
        Self {
            capture,
            section_consistent,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResponse {
    #[serde(flatten)]
    pub outcome: BulkOutcome,
    pub updated_count: usize,
    pub failed_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestTagsResponse {
    pub suggested: DsdTagPatch,
    pub capture: Capture,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// Loads a capture and checks the caller owns its project.
async fn load_owned_capture(
    state: &AppState,
    capture_id: Uuid,
    user_id: Uuid,
) -> Result<Capture, AppError> {
    let capture = store::get_capture(&state.db, capture_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Capture {capture_id} not found")))?;
    require_owned(&state.db, capture.project_id, user_id).await?;
    Ok(capture)
}

/// POST /api/captures
///
/// Used by both the dashboard form and the extension background script.
pub async fn handle_create_capture(
    State(state): State<AppState>,
    Json(request): Json<CreateCaptureRequest>,
) -> Result<(StatusCode, Json<Capture>), AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    require_owned(&state.db, request.project_id, request.user_id).await?;

    let platform = request
        .platform
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("web");

    let capture = store::insert_capture(
        &state.db,
        NewCapture {
            project_id: request.project_id,
            user_id: request.user_id,
            capture_type: request.capture_type.unwrap_or(CaptureType::Text),
            platform,
            title,
            content: &request.content,
            source_url: request.source_url.as_deref(),
            screenshot_ref: request.screenshot_ref.as_deref(),
            user_note: request.user_note.as_deref(),
            tags: &request.tags,
        },
    )
    .await?;

    info!(
        "Created capture {} in project {}",
        capture.id, capture.project_id
    );
    Ok((StatusCode::CREATED, Json(capture)))
}

/// GET /api/captures?userId=&projectId=&search=&platform=&section=&tag=&sort=
pub async fn handle_list_captures(
    State(state): State<AppState>,
    Query(query): Query<ListCapturesQuery>,
) -> Result<Json<Vec<Capture>>, AppError> {
    let filter = query.filter()?;
    require_owned(&state.db, query.project_id, query.user_id).await?;

    let all = store::list_for_project(&state.db, query.project_id).await?;
    let mut captures = filter_captures(all, &filter);
    sort_captures(&mut captures, query.sort.unwrap_or_default());

    Ok(Json(captures))
}

/// GET /api/captures/recent?userId=&limit=
pub async fn handle_recent_captures(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Capture>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);
    let captures = store::list_recent_for_user(&state.db, query.user_id, limit).await?;
    Ok(Json(captures))
}

/// GET /api/captures/:id?userId=
pub async fn handle_get_capture(
    State(state): State<AppState>,
    Path(capture_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Capture>, AppError> {
    let capture = load_owned_capture(&state, capture_id, user.user_id).await?;
    Ok(Json(capture))
}

/// PATCH /api/captures/:id?userId=
///
/// Descriptive fields and tagging fields are saved as separate column groups.
pub async fn handle_update_capture(
    State(state): State<AppState>,
    Path(capture_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(update): Json<CaptureUpdate>,
) -> Result<Json<TaggingResponse>, AppError> {
    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    let mut capture = load_owned_capture(&state, capture_id, user.user_id).await?;
    let details = update.touches_details();
    let tagging = !update.tagging.is_empty();
    update.apply(&mut capture);

    if details {
        store::save_details(&state.db, &capture).await?;
    }
    if tagging {
        PgCaptureStore::new(state.db.clone())
            .save_tagging(&capture)
            .await?;
    }

    Ok(Json(capture.into()))
}

/// PUT /api/captures/:id/tags/:tag?userId=
pub async fn handle_set_tag(
    State(state): State<AppState>,
    Path((capture_id, tag)): Path<(Uuid, String)>,
    Query(user): Query<UserQuery>,
    Json(request): Json<SetTagRequest>,
) -> Result<Json<TaggingResponse>, AppError> {
    let tag: DsdTag = tag.parse().map_err(AppError::Validation)?;

    let mut capture = load_owned_capture(&state, capture_id, user.user_id).await?;
    if let Some(section) = set_tag(&mut capture, tag, request.value) {
        info!("Capture {capture_id} auto-assigned to section {section} by tag {}", tag.as_str());
    }
    PgCaptureStore::new(state.db.clone())
        .save_tagging(&capture)
        .await?;

    Ok(Json(capture.into()))
}

/// PUT /api/captures/:id/section?userId=
///
/// Explicit assignment always overwrites, regardless of current tags.
pub async fn handle_assign_section(
    State(state): State<AppState>,
    Path(capture_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(request): Json<AssignSectionRequest>,
) -> Result<Json<TaggingResponse>, AppError> {
    let mut capture = load_owned_capture(&state, capture_id, user.user_id).await?;
    assign_section(&mut capture, request.section);
    PgCaptureStore::new(state.db.clone())
        .save_tagging(&capture)
        .await?;

    Ok(Json(capture.into()))
}

/// POST /api/captures/bulk-update?userId=
///
/// Applied one capture at a time with no rollback. Per-item results are returned.
pub async fn handle_bulk_update(
    State(state): State<AppState>,
    Query(user): Query<UserQuery>,
    Json(request): Json<BulkUpdateRequest>,
) -> Result<Json<BulkUpdateResponse>, AppError> {
    if request.capture_ids.is_empty() {
        return Err(AppError::Validation("captureIds cannot be empty".to_string()));
    }
    if request.patch.is_empty() {
        return Err(AppError::Validation(
            "bulk update needs dsdTags or dsdSection".to_string(),
        ));
    }

    let owned = owned_project_ids(&state.db, user.user_id).await?;
    let store = PgCaptureStore::new(state.db.clone());
    let outcome = bulk_update(&store, &request.capture_ids, &request.patch, &owned).await;

    Ok(Json(BulkUpdateResponse {
        updated_count: outcome.updated_count(),
        failed_count: outcome.failed.len(),
        outcome,
    }))
}

/// POST /api/captures/:id/ai-suggest-tags?userId=
pub async fn handle_suggest_tags(
    State(state): State<AppState>,
    Path(capture_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<Json<SuggestTagsResponse>, AppError> {
    let mut capture = load_owned_capture(&state, capture_id, user.user_id).await?;

    let suggested = suggest_tags(&state.llm, &capture).await?;
    merge_tags(&mut capture, &suggested);
    PgCaptureStore::new(state.db.clone())
        .save_tagging(&capture)
        .await?;

    info!(
        "Merged {} suggested tags into capture {capture_id}",
        suggested.len()
    );
    Ok(Json(SuggestTagsResponse { suggested, capture }))
}

/// POST /api/captures/:id/analyze?userId=
pub async fn handle_analyze_capture(
    State(state): State<AppState>,
    Path(capture_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Capture>, AppError> {
    let capture = load_owned_capture(&state, capture_id, user.user_id).await?;
    let store = PgCaptureStore::new(state.db.clone());
    let analyzed = analyze_capture(&store, state.analyzer.as_ref(), capture).await?;
    Ok(Json(analyzed))
}

/// POST /api/captures/analyze-batch?userId=
///
/// Sequential; reports how many of the requested captures were analyzed.
pub async fn handle_analyze_batch(
    State(state): State<AppState>,
    Query(user): Query<UserQuery>,
    Json(request): Json<AnalyzeBatchRequest>,
) -> Result<Json<BatchReport>, AppError> {
    if request.capture_ids.is_empty() {
        return Err(AppError::Validation("captureIds cannot be empty".to_string()));
    }

    let owned = owned_project_ids(&state.db, user.user_id).await?;
    let store = PgCaptureStore::new(state.db.clone());
    let report = analyze_batch(&store, state.analyzer.as_ref(), &request.capture_ids, &owned).await;

    if report.successful < report.processed {
        warn!(
            "Batch analysis for user {}: {} of {} failed",
            user.user_id,
            report.processed - report.successful,
            report.processed
        );
    }
    Ok(Json(report))
}

/// POST /api/captures/process-pending?userId=
///
/// Analyzes every pending capture across the user's projects, oldest first.
pub async fn handle_process_pending(
    State(state): State<AppState>,
    Query(user): Query<UserQuery>,
) -> Result<Json<BatchReport>, AppError> {
    let pending = store::list_pending_for_user(&state.db, user.user_id).await?;
    if pending.is_empty() {
        return Ok(Json(BatchReport::default()));
    }

    let store = PgCaptureStore::new(state.db.clone());
    let report = analyze_pending(&store, state.analyzer.as_ref(), pending).await;
    info!(
        "Processed pending captures for user {}: {}/{} analyzed",
        user.user_id, report.successful, report.processed
    );
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures::models::fixtures::capture;

    #[test]
    fn test_update_parses_details_and_tagging_together() {
        let update: CaptureUpdate = serde_json::from_str(
            r#"{"workspaceNotes": "follow up", "dsdTags": {"humanTruth": true}}"#,
        )
        .unwrap();
        assert!(update.touches_details());
        assert!(!update.tagging.is_empty());

        let mut c = capture("X", "...");
        update.apply(&mut c);
        assert_eq!(c.workspace_notes.as_deref(), Some("follow up"));
        assert!(c.dsd_tags.human_truth);
        assert_eq!(c.dsd_section, Some(DsdSection::Shift));
    }

    #[test]
    fn test_update_explicit_section_beats_heuristic() {
        let update: CaptureUpdate = serde_json::from_str(
            r#"{"dsdTags": {"lifeLens": true}, "dsdSection": "deliver"}"#,
        )
        .unwrap();
        assert!(!update.touches_details());

        let mut c = capture("X", "...");
        update.apply(&mut c);
        assert_eq!(c.dsd_section, Some(DsdSection::Deliver));
    }

    #[test]
    fn test_update_null_clears_note() {
        let update: CaptureUpdate = serde_json::from_str(r#"{"userNote": null}"#).unwrap();
        let mut c = capture("X", "...");
        c.user_note = Some("old".to_string());
        update.apply(&mut c);
        assert_eq!(c.user_note, None);
    }

    #[test]
    fn test_bulk_request_flattens_patch() {
        let request: BulkUpdateRequest = serde_json::from_str(
            r#"{"captureIds": ["00000000-0000-0000-0000-000000000001"], "dsdSection": "deliver"}"#,
        )
        .unwrap();
        assert_eq!(request.capture_ids.len(), 1);
        assert_eq!(request.patch.dsd_section, Some(Some(DsdSection::Deliver)));
    }

    #[test]
    fn test_list_query_rejects_unknown_section() {
        let query = ListCapturesQuery {
            user_id: Uuid::nil(),
            project_id: Uuid::nil(),
            search: None,
            platform: Some("all".to_string()),
            section: Some("later".to_string()),
            tag: None,
            sort: None,
        };
        assert!(matches!(query.filter(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_tagging_response_reports_inconsistent_section() {
        let mut c = capture("X", "...");
        c.dsd_section = Some(DsdSection::Deliver);
        let response = TaggingResponse::from(c);
        assert!(!response.section_consistent);
    }
}
