//! Axum route handlers for sources, signals, hypothesis validations and cultural moments.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::captures::filter::Choice;
use crate::captures::models::Capture;
use crate::captures::store::get_capture;
use crate::errors::AppError;
use crate::models::signals::{CulturalMomentRow, HypothesisValidationRow, SignalRow, SourceRow};
use crate::models::UserQuery;
use crate::projects::store::require_owned;
use crate::signals::models::{
    arrange_signals, MomentPatch, NewMoment, NewSignal, NewSource, NewValidation, SignalPatch,
    SignalSort, SourcePatch, ValidationPatch,
};
use crate::signals::store;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceQuery {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalQuery {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub category: Option<String>,
    pub sort: Option<SignalSort>,
}

/// Optional project links must point at one of the caller's projects.
async fn check_project_link(
    state: &AppState,
    project_id: Option<Uuid>,
    user_id: Uuid,
) -> Result<(), AppError> {
    if let Some(project_id) = project_id {
        require_owned(&state.db, project_id, user_id).await?;
    }
    Ok(())
}

/// A linked capture must exist and, when a project is also linked, belong to it.
/// Returns the project that owns the capture.
fn linked_capture_project(
    capture: Option<Capture>,
    capture_id: Uuid,
    project_id: Option<Uuid>,
) -> Result<Uuid, AppError> {
    let capture = capture.ok_or_else(|| AppError::NotFound(format!("Capture {capture_id} not found")))?;
    if let Some(project_id) = project_id {
        if capture.project_id != project_id {
            return Err(AppError::Validation(format!(
                "Capture {capture_id} does not belong to project {project_id}"
            )));
        }
    }
    Ok(capture.project_id)
}

/// Optional capture links must point at a capture in one of the caller's projects.
async fn check_capture_link(
    state: &AppState,
    capture_id: Option<Uuid>,
    project_id: Option<Uuid>,
    user_id: Uuid,
) -> Result<(), AppError> {
    if let Some(capture_id) = capture_id {
        let capture = get_capture(&state.db, capture_id).await?;
        let owner_project = linked_capture_project(capture, capture_id, project_id)?;
        require_owned(&state.db, owner_project, user_id).await?;
    }
    Ok(())
}

/// 404 when missing, 403 when the row belongs to someone else.
fn owned<T>(
    row: Option<T>,
    owner: impl Fn(&T) -> Uuid,
    user_id: Uuid,
    what: &str,
    id: Uuid,
) -> Result<T, AppError> {
    let row = row.ok_or_else(|| AppError::NotFound(format!("{what} {id} not found")))?;
    if owner(&row) != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(row)
}

// ────────────────────────────────────────────────────────────────────────────
// Sources
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/sources?userId=&projectId=
pub async fn handle_list_sources(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<SourceRow>>, AppError> {
    let rows = store::list_sources(&state.db, query.user_id, query.project_id).await?;
    Ok(Json(rows))
}

/// POST /api/sources
pub async fn handle_create_source(
    State(state): State<AppState>,
    Json(request): Json<NewSource>,
) -> Result<(StatusCode, Json<SourceRow>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    check_project_link(&state, request.project_id, request.user_id).await?;
    let row = store::insert_source(&state.db, &request).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/sources/:id?userId=
pub async fn handle_update_source(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(patch): Json<SourcePatch>,
) -> Result<Json<SourceRow>, AppError> {
    let found = store::get_source(&state.db, id).await?;
    let mut row = owned(found, |r| r.user_id, user.user_id, "Source", id)?;
    patch.apply(&mut row).map_err(AppError::Validation)?;
    let row = store::update_source(&state.db, &row).await?;
    Ok(Json(row))
}

// ────────────────────────────────────────────────────────────────────────────
// Signals
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/signals?userId=&projectId=&category=&sort=engagement
pub async fn handle_list_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> Result<Json<Vec<SignalRow>>, AppError> {
    let rows = store::list_signals(&state.db, query.user_id, query.project_id).await?;
    let category = Choice::text(query.category.as_deref());
    Ok(Json(arrange_signals(
        rows,
        &category,
        query.sort.unwrap_or_default(),
    )))
}

/// POST /api/signals
pub async fn handle_create_signal(
    State(state): State<AppState>,
    Json(request): Json<NewSignal>,
) -> Result<(StatusCode, Json<SignalRow>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    check_project_link(&state, request.project_id, request.user_id).await?;
    let row = store::insert_signal(&state.db, &request).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/signals/:id?userId=
pub async fn handle_update_signal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(patch): Json<SignalPatch>,
) -> Result<Json<SignalRow>, AppError> {
    let found = store::get_signal(&state.db, id).await?;
    let mut row = owned(found, |r| r.user_id, user.user_id, "Signal", id)?;
    patch.apply(&mut row).map_err(AppError::Validation)?;
    let row = store::update_signal(&state.db, &row).await?;
    Ok(Json(row))
}

// ────────────────────────────────────────────────────────────────────────────
// Hypothesis validations
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/hypothesis-validations?userId=&projectId=
pub async fn handle_list_validations(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<HypothesisValidationRow>>, AppError> {
    let rows = store::list_validations(&state.db, query.user_id, query.project_id).await?;
    Ok(Json(rows))
}

/// POST /api/hypothesis-validations
pub async fn handle_create_validation(
    State(state): State<AppState>,
    Json(request): Json<NewValidation>,
) -> Result<(StatusCode, Json<HypothesisValidationRow>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    check_project_link(&state, request.project_id, request.user_id).await?;
    check_capture_link(&state, request.capture_id, request.project_id, request.user_id).await?;
    let row = store::insert_validation(&state.db, &request).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/hypothesis-validations/:id?userId=
pub async fn handle_update_validation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(patch): Json<ValidationPatch>,
) -> Result<Json<HypothesisValidationRow>, AppError> {
    let found = store::get_validation(&state.db, id).await?;
    let mut row = owned(found, |r| r.user_id, user.user_id, "Hypothesis validation", id)?;
    patch.apply(&mut row).map_err(AppError::Validation)?;
    let row = store::update_validation(&state.db, &row).await?;
    Ok(Json(row))
}

// ────────────────────────────────────────────────────────────────────────────
// Cultural moments
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/cultural-moments?userId=&projectId=
///
/// Most intense first.
pub async fn handle_list_moments(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Vec<CulturalMomentRow>>, AppError> {
    let rows = store::list_moments(&state.db, query.user_id, query.project_id).await?;
    Ok(Json(rows))
}

/// POST /api/cultural-moments
pub async fn handle_create_moment(
    State(state): State<AppState>,
    Json(request): Json<NewMoment>,
) -> Result<(StatusCode, Json<CulturalMomentRow>), AppError> {
    request.validate().map_err(AppError::Validation)?;
    check_project_link(&state, request.project_id, request.user_id).await?;
    let row = store::insert_moment(&state.db, &request).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/cultural-moments/:id?userId=
pub async fn handle_update_moment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(patch): Json<MomentPatch>,
) -> Result<Json<CulturalMomentRow>, AppError> {
    let found = store::get_moment(&state.db, id).await?;
    let mut row = owned(found, |r| r.user_id, user.user_id, "Cultural moment", id)?;
    patch.apply(&mut row).map_err(AppError::Validation)?;
    let row = store::update_moment(&state.db, &row).await?;
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures::models::fixtures::capture;

    #[test]
    fn test_missing_linked_capture_is_not_found() {
        let id = Uuid::new_v4();
        let result = linked_capture_project(None, id, None);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_linked_capture_from_other_project_is_rejected() {
        let c = capture("Trend", "content");
        let result = linked_capture_project(Some(c.clone()), c.id, Some(Uuid::new_v4()));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_linked_capture_resolves_owning_project() {
        let mut c = capture("Trend", "content");
        let project = Uuid::new_v4();
        c.project_id = project;
        assert_eq!(linked_capture_project(Some(c.clone()), c.id, Some(project)).unwrap(), project);
        assert_eq!(linked_capture_project(Some(c.clone()), c.id, None).unwrap(), project);
    }

    #[test]
    fn test_owned_distinguishes_missing_and_foreign_rows() {
        let user = Uuid::new_v4();
        let id = Uuid::new_v4();
        let missing = owned(None::<Uuid>, |owner| *owner, user, "Signal", id);
        assert!(matches!(missing, Err(AppError::NotFound(_))));
        let foreign = owned(Some(Uuid::new_v4()), |owner| *owner, user, "Signal", id);
        assert!(matches!(foreign, Err(AppError::Forbidden)));
    }
}
