use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::briefs::models::{template_sections, Brief, BriefTemplate};
use crate::errors::AppError;
use crate::models::brief::BriefRow;

pub async fn list_briefs(pool: &PgPool, project_id: Uuid) -> Result<Vec<Brief>, AppError> {
    sqlx::query_as::<_, BriefRow>(
        "SELECT * FROM briefs WHERE project_id = $1 ORDER BY created_at DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Brief::try_from)
    .collect()
}

pub async fn get_brief(pool: &PgPool, id: Uuid) -> Result<Option<Brief>, AppError> {
    sqlx::query_as::<_, BriefRow>("SELECT * FROM briefs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Brief::try_from)
        .transpose()
}

/// Creates a draft brief with every section of its template present and empty.
pub async fn insert_brief(
    pool: &PgPool,
    project_id: Uuid,
    title: &str,
    description: Option<&str>,
    template: BriefTemplate,
) -> Result<Brief, AppError> {
    sqlx::query_as::<_, BriefRow>(
        r#"
        INSERT INTO briefs (id, project_id, title, description, template, status, sections)
        VALUES ($1, $2, $3, $4, $5, 'draft', $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(project_id)
    .bind(title)
    .bind(description)
    .bind(template.as_str())
    .bind(Json(template_sections(template)))
    .fetch_one(pool)
    .await?
    .try_into()
}

/// Writes title, description and status.
pub async fn save_header(pool: &PgPool, brief: &Brief) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE briefs
        SET title = $1, description = $2, status = $3, updated_at = NOW()
        WHERE id = $4
        "#,
    )
    .bind(&brief.title)
    .bind(&brief.description)
    .bind(brief.status.as_str())
    .bind(brief.id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Writes the whole sections document. List order is stored as given.
pub async fn save_sections(pool: &PgPool, brief: &Brief) -> Result<(), AppError> {
    sqlx::query("UPDATE briefs SET sections = $1, updated_at = NOW() WHERE id = $2")
        .bind(Json(&brief.sections))
        .bind(brief.id)
        .execute(pool)
        .await?;
    Ok(())
}
