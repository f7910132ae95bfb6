//! Axum route handlers for the Cohort Builder.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::cohorts::models::{Cohort, NewCohort};
use crate::cohorts::pillars::{Pillar, PILLARS};
use crate::cohorts::report::{render_cohort_report, REPORT_FILENAME};
use crate::cohorts::session::{add_cohort, remove_cohort, validate_session_id};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/cohorts/pillars
pub async fn handle_list_pillars() -> Json<&'static [Pillar]> {
    Json(PILLARS.as_slice())
}

/// GET /api/cohorts/sessions/:session_id
pub async fn handle_list_cohorts(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Cohort>>, AppError> {
    validate_session_id(&session_id)?;
    let cohorts = state.cohorts.load(&session_id).await?;
    Ok(Json(cohorts))
}

/// POST /api/cohorts/sessions/:session_id
pub async fn handle_add_cohort(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<NewCohort>,
) -> Result<(StatusCode, Json<Cohort>), AppError> {
    validate_session_id(&session_id)?;
    let cohort = request.into_cohort().map_err(AppError::Validation)?;

    let mut cohorts = state.cohorts.load(&session_id).await?;
    add_cohort(&mut cohorts, cohort.clone());
    state.cohorts.save(&session_id, &cohorts).await?;

    info!("Added cohort '{}' to session {session_id}", cohort.name);
    Ok((StatusCode::CREATED, Json(cohort)))
}

/// DELETE /api/cohorts/sessions/:session_id/:cohort_id
pub async fn handle_remove_cohort(
    State(state): State<AppState>,
    Path((session_id, cohort_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    validate_session_id(&session_id)?;

    let mut cohorts = state.cohorts.load(&session_id).await?;
    if !remove_cohort(&mut cohorts, cohort_id) {
        return Err(AppError::NotFound(format!("Cohort {cohort_id} not found")));
    }
    state.cohorts.save(&session_id, &cohorts).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/cohorts/sessions/:session_id/report
pub async fn handle_cohort_report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_session_id(&session_id)?;
    let cohorts = state.cohorts.load(&session_id).await?;
    let body = render_cohort_report(&cohorts, Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILENAME}\""),
            ),
        ],
        body,
    ))
}
