use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::briefs::models::BriefTemplate;
use crate::errors::AppError;
use crate::models::double_option;
use crate::models::project::{ProjectRow, ProjectStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub client: Option<String>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub brief_template: Option<BriefTemplate>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial project update. Absent fields are left alone; `null` clears nullable ones.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub client: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    pub brief_template: Option<BriefTemplate>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl ProjectPatch {
    pub fn apply(self, project: &mut ProjectRow) {
        if let Some(name) = self.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(client) = self.client {
            project.client = client;
        }
        if let Some(status) = self.status {
            project.status = status.as_str().to_string();
        }
        if let Some(template) = self.brief_template {
            project.brief_template = template.as_str().to_string();
        }
        if let Some(tags) = self.tags {
            project.tags = tags;
        }
        if let Some(deadline) = self.deadline {
            project.deadline = deadline;
        }
    }
}

pub async fn list_projects(pool: &PgPool, user_id: Uuid) -> Result<Vec<ProjectRow>, AppError> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_project(pool: &PgPool, id: Uuid) -> Result<Option<ProjectRow>, AppError> {
    let row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Loads a project and checks it belongs to `user_id`: 404 if missing, 403 if foreign.
pub async fn require_owned(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectRow, AppError> {
    let project = get_project(pool, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;
    if project.user_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(project)
}

pub async fn owned_project_ids(pool: &PgPool, user_id: Uuid) -> Result<HashSet<Uuid>, AppError> {
    let ids: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM projects WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}

pub async fn insert_project(pool: &PgPool, new: NewProject) -> Result<ProjectRow, AppError> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        INSERT INTO projects
            (id, user_id, name, description, client, status, brief_template, tags, deadline)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.name.trim())
    .bind(&new.description)
    .bind(&new.client)
    .bind(new.status.unwrap_or(ProjectStatus::Active).as_str())
    .bind(new.brief_template.unwrap_or_default().as_str())
    .bind(&new.tags)
    .bind(new.deadline)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_project(pool: &PgPool, project: &ProjectRow) -> Result<ProjectRow, AppError> {
    let row = sqlx::query_as::<_, ProjectRow>(
        r#"
        UPDATE projects
        SET name = $1, description = $2, client = $3, status = $4,
            brief_template = $5, tags = $6, deadline = $7, updated_at = NOW()
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.client)
    .bind(&project.status)
    .bind(&project.brief_template)
    .bind(&project.tags)
    .bind(project.deadline)
    .bind(project.id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Deletes the project; captures and briefs go with it via `ON DELETE CASCADE`.
pub async fn delete_project(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
