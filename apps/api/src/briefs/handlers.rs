//! Axum route handlers for the Briefs API.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::briefs::assembly::{
    attach_capture, attached_ids, available_captures, detach_capture, reorder_section,
    update_section_content,
};
use crate::briefs::export::{
    archive_export, content_disposition, export_filename, list_exports, ExportFormat,
};
use crate::briefs::generate::{generate_sections, CaptureInsight};
use crate::briefs::models::{
    template_catalog, Brief, BriefSections, BriefStatus, BriefTemplate, SectionKey, TemplateInfo,
};
use crate::briefs::render::{render_brief, BriefDocument, EvidenceItem};
use crate::briefs::store;
use crate::captures::models::Capture;
use crate::captures::store::{get_capture, list_for_project};
use crate::errors::AppError;
use crate::models::brief::BriefExportRow;
use crate::models::{double_option, UserQuery};
use crate::projects::store::require_owned;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBriefsQuery {
    pub user_id: Uuid,
    pub project_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBriefRequest {
    pub user_id: Uuid,
    pub project_id: Uuid,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    /// Falls back to the project's default template.
    pub template: Option<BriefTemplate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<BriefStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachRequest {
    pub capture_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SectionContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub capture_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub sections: BriefSections,
    #[serde(default)]
    pub captures: Vec<CaptureInsight>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub sections: BriefSections,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub format: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub sections: BriefSections,
    #[serde(default)]
    pub captures: Vec<EvidenceItem>,
}

#[derive(Debug, Deserialize)]
pub struct PersistedExportRequest {
    pub format: String,
}

fn parse_section(raw: &str) -> Result<SectionKey, AppError> {
    raw.parse().map_err(AppError::Validation)
}

fn parse_format(raw: &str) -> Result<ExportFormat, AppError> {
    let format: ExportFormat = raw.parse().map_err(AppError::Validation)?;
    format.ensure_renderable()?;
    Ok(format)
}

fn file_response(format: ExportFormat, title: &str, body: Bytes) -> Response {
    let filename = export_filename(title, format);
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        body,
    )
        .into_response()
}

/// Loads a brief and checks the caller owns its project.
async fn load_owned_brief(state: &AppState, brief_id: Uuid, user_id: Uuid) -> Result<Brief, AppError> {
    let brief = store::get_brief(&state.db, brief_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Brief {brief_id} not found")))?;
    require_owned(&state.db, brief.project_id, user_id).await?;
    Ok(brief)
}

/// Captures of the brief's project that are attached to at least one section.
fn attached_captures<'a>(brief: &Brief, captures: &'a [Capture]) -> Vec<&'a Capture> {
    let attached = attached_ids(brief);
    captures.iter().filter(|c| attached.contains(&c.id)).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/briefs/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(template_catalog())
}

/// GET /api/briefs?userId=&projectId=
pub async fn handle_list_briefs(
    State(state): State<AppState>,
    Query(query): Query<ListBriefsQuery>,
) -> Result<Json<Vec<Brief>>, AppError> {
    require_owned(&state.db, query.project_id, query.user_id).await?;
    let briefs = store::list_briefs(&state.db, query.project_id).await?;
    Ok(Json(briefs))
}

/// POST /api/briefs
pub async fn handle_create_brief(
    State(state): State<AppState>,
    Json(request): Json<CreateBriefRequest>,
) -> Result<(StatusCode, Json<Brief>), AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    let project = require_owned(&state.db, request.project_id, request.user_id).await?;
    let template = match request.template {
        Some(t) => t,
        None => project.brief_template.parse().unwrap_or_default(),
    };

    let brief = store::insert_brief(
        &state.db,
        project.id,
        title,
        request.description.as_deref(),
        template,
    )
    .await?;

    info!(
        "Created {} brief {} in project {}",
        template.as_str(),
        brief.id,
        project.id
    );
    Ok((StatusCode::CREATED, Json(brief)))
}

/// GET /api/briefs/:id?userId=
pub async fn handle_get_brief(
    State(state): State<AppState>,
    Path(brief_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Brief>, AppError> {
    let brief = load_owned_brief(&state, brief_id, user.user_id).await?;
    Ok(Json(brief))
}

/// PATCH /api/briefs/:id?userId=
pub async fn handle_update_brief(
    State(state): State<AppState>,
    Path(brief_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(patch): Json<BriefPatch>,
) -> Result<Json<Brief>, AppError> {
    let mut brief = load_owned_brief(&state, brief_id, user.user_id).await?;

    if let Some(title) = patch.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }
        brief.title = title.to_string();
    }
    if let Some(description) = patch.description {
        brief.description = description;
    }
    if let Some(status) = patch.status {
        brief.status = status;
    }

    store::save_header(&state.db, &brief).await?;
    Ok(Json(brief))
}

/// POST /api/briefs/:id/sections/:section/captures?userId=
pub async fn handle_attach_capture(
    State(state): State<AppState>,
    Path((brief_id, section)): Path<(Uuid, String)>,
    Query(user): Query<UserQuery>,
    Json(request): Json<AttachRequest>,
) -> Result<Json<Brief>, AppError> {
    let key = parse_section(&section)?;
    let mut brief = load_owned_brief(&state, brief_id, user.user_id).await?;
    let capture = get_capture(&state.db, request.capture_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Capture {} not found", request.capture_id)))?;

    if attach_capture(&mut brief, key, &capture)? {
        store::save_sections(&state.db, &brief).await?;
    }
    Ok(Json(brief))
}

/// DELETE /api/briefs/:id/sections/:section/captures/:capture_id?userId=
pub async fn handle_detach_capture(
    State(state): State<AppState>,
    Path((brief_id, section, capture_id)): Path<(Uuid, String, Uuid)>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Brief>, AppError> {
    let key = parse_section(&section)?;
    let mut brief = load_owned_brief(&state, brief_id, user.user_id).await?;

    if detach_capture(&mut brief, key, capture_id)? {
        store::save_sections(&state.db, &brief).await?;
    }
    Ok(Json(brief))
}

/// PUT /api/briefs/:id/sections/:section/content?userId=
pub async fn handle_update_section_content(
    State(state): State<AppState>,
    Path((brief_id, section)): Path<(Uuid, String)>,
    Query(user): Query<UserQuery>,
    Json(request): Json<SectionContentRequest>,
) -> Result<Json<Brief>, AppError> {
    let key = parse_section(&section)?;
    let mut brief = load_owned_brief(&state, brief_id, user.user_id).await?;

    update_section_content(&mut brief, key, request.content)?;
    store::save_sections(&state.db, &brief).await?;
    Ok(Json(brief))
}

/// PUT /api/briefs/:id/sections/:section/order?userId=
///
/// Saves the section's whole capture list in the submitted order.
pub async fn handle_reorder_section(
    State(state): State<AppState>,
    Path((brief_id, section)): Path<(Uuid, String)>,
    Query(user): Query<UserQuery>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Brief>, AppError> {
    let key = parse_section(&section)?;
    let mut brief = load_owned_brief(&state, brief_id, user.user_id).await?;

    let project_ids: HashSet<Uuid> = list_for_project(&state.db, brief.project_id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    reorder_section(&mut brief, key, request.capture_ids, &project_ids)?;
    store::save_sections(&state.db, &brief).await?;
    Ok(Json(brief))
}

/// GET /api/briefs/:id/available?userId=
///
/// Project captures not attached to any section of this brief.
pub async fn handle_available_captures(
    State(state): State<AppState>,
    Path(brief_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Vec<Capture>>, AppError> {
    let brief = load_owned_brief(&state, brief_id, user.user_id).await?;
    let captures = list_for_project(&state.db, brief.project_id).await?;
    Ok(Json(available_captures(captures, &brief)))
}

/// POST /api/briefs/generate
///
/// Stateless: returns enhanced sections for the submitted draft without saving.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    require_owned(&state.db, request.project_id, request.user_id).await?;

    let sections = generate_sections(
        &state.llm,
        &request.title,
        request.description.as_deref(),
        request.sections,
        &request.captures,
    )
    .await?;

    Ok(Json(GenerateResponse { sections }))
}

/// POST /api/briefs/:id/generate?userId=
///
/// Generates commentary from the brief's attached captures and saves it.
pub async fn handle_generate_for_brief(
    State(state): State<AppState>,
    Path(brief_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Brief>, AppError> {
    let mut brief = load_owned_brief(&state, brief_id, user.user_id).await?;
    let captures = list_for_project(&state.db, brief.project_id).await?;
    let insights: Vec<CaptureInsight> = attached_captures(&brief, &captures)
        .into_iter()
        .map(CaptureInsight::from)
        .collect();

    brief.sections = generate_sections(
        &state.llm,
        &brief.title,
        brief.description.as_deref(),
        std::mem::take(&mut brief.sections),
        &insights,
    )
    .await?;
    store::save_sections(&state.db, &brief).await?;

    Ok(Json(brief))
}

/// POST /api/briefs/export
///
/// Renders the submitted brief and returns it as a download. Nothing is stored.
pub async fn handle_export(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    let format = parse_format(&request.format)?;

    let doc = BriefDocument {
        title: &request.title,
        description: request.description.as_deref(),
        sections: &request.sections,
    };
    let body = Bytes::from(render_brief(&doc, &request.captures));

    Ok(file_response(format, &request.title, body))
}

/// POST /api/briefs/:id/export?userId=
///
/// Renders the stored brief, archives the file to S3 and records it in the history.
pub async fn handle_export_brief(
    State(state): State<AppState>,
    Path(brief_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(request): Json<PersistedExportRequest>,
) -> Result<Response, AppError> {
    let format = parse_format(&request.format)?;
    let brief = load_owned_brief(&state, brief_id, user.user_id).await?;
    let captures = list_for_project(&state.db, brief.project_id).await?;
    let evidence: Vec<EvidenceItem> = attached_captures(&brief, &captures)
        .into_iter()
        .map(EvidenceItem::from)
        .collect();

    let doc = BriefDocument {
        title: &brief.title,
        description: brief.description.as_deref(),
        sections: &brief.sections,
    };
    let body = Bytes::from(render_brief(&doc, &evidence));

    let record = archive_export(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        brief.id,
        format,
        body.clone(),
    )
    .await?;
    info!("Exported brief {} as {} ({})", brief.id, format.as_str(), record.s3_key);

    Ok(file_response(format, &brief.title, body))
}

/// GET /api/briefs/:id/exports?userId=
pub async fn handle_list_exports(
    State(state): State<AppState>,
    Path(brief_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Vec<BriefExportRow>>, AppError> {
    let brief = load_owned_brief(&state, brief_id, user.user_id).await?;
    let exports = list_exports(&state.db, brief.id).await?;
    Ok(Json(exports))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_response_with_control_characters_in_title() {
        let response = file_response(
            ExportFormat::Markdown,
            "Launch\u{1}\nPlan",
            Bytes::from_static(b"# Launch"),
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Launch-Plan.md\""
        );
    }

    #[test]
    fn test_parse_format_maps_errors() {
        assert_eq!(parse_format("markdown").unwrap(), ExportFormat::Markdown);
        assert!(matches!(parse_format("docx"), Err(AppError::Validation(_))));
        assert!(matches!(
            parse_format("slides"),
            Err(AppError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_file_response_headers() {
        let response = file_response(ExportFormat::Markdown, "Q3 Culture Brief", Bytes::from_static(b"# Q3"));
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/markdown");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Q3-Culture-Brief.md\""
        );
    }

    #[test]
    fn test_export_request_accepts_dashboard_payload() {
        let request: ExportRequest = serde_json::from_str(
            r#"{
                "format": "markdown",
                "title": "Brief",
                "sections": {"performance": {"title": "Performance", "content": "Up", "captures": []}},
                "captures": [{"id": "00000000-0000-0000-0000-000000000001", "title": "A", "platform": null}]
            }"#,
        )
        .unwrap();
        assert_eq!(request.sections.len(), 1);
        assert_eq!(request.captures.len(), 1);
    }
}
