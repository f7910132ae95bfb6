//! Axum route handlers for the Projects API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::project::ProjectRow;
use crate::models::UserQuery;
use crate::projects::store::{self, NewProject, ProjectPatch};
use crate::state::AppState;

/// GET /api/projects?userId=
pub async fn handle_list_projects(
    State(state): State<AppState>,
    Query(user): Query<UserQuery>,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    let projects = store::list_projects(&state.db, user.user_id).await?;
    Ok(Json(projects))
}

/// POST /api/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    Json(request): Json<NewProject>,
) -> Result<(StatusCode, Json<ProjectRow>), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let project = store::insert_project(&state.db, request).await?;
    info!("Created project {} for user {}", project.id, project.user_id);

    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id?userId=
pub async fn handle_get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<Json<ProjectRow>, AppError> {
    let project = store::require_owned(&state.db, project_id, user.user_id).await?;
    Ok(Json(project))
}

/// PATCH /api/projects/:id?userId=
///
/// Last write wins per field; there is no version check.
pub async fn handle_update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<ProjectRow>, AppError> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let mut project = store::require_owned(&state.db, project_id, user.user_id).await?;
    patch.apply(&mut project);
    let project = store::update_project(&state.db, &project).await?;

    Ok(Json(project))
}

/// DELETE /api/projects/:id?userId=
///
/// Cascades to the project's captures and briefs.
pub async fn handle_delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(user): Query<UserQuery>,
) -> Result<StatusCode, AppError> {
    store::require_owned(&state.db, project_id, user.user_id).await?;
    store::delete_project(&state.db, project_id).await?;
    info!("Deleted project {project_id} and its captures and briefs");
    Ok(StatusCode::NO_CONTENT)
}
