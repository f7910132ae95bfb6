use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::signals::{CulturalMomentRow, HypothesisValidationRow, SignalRow, SourceRow};
use crate::signals::models::{NewMoment, NewSignal, NewSource, NewValidation};

// Every list is scoped to the user; `project_id` narrows it further when given.

pub async fn list_sources(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Option<Uuid>,
) -> Result<Vec<SourceRow>, AppError> {
    let rows = sqlx::query_as::<_, SourceRow>(
        r#"
        SELECT * FROM sources
        WHERE user_id = $1 AND ($2::uuid IS NULL OR project_id = $2)
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_source(pool: &PgPool, id: Uuid) -> Result<Option<SourceRow>, AppError> {
    let row = sqlx::query_as::<_, SourceRow>("SELECT * FROM sources WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn insert_source(pool: &PgPool, new: &NewSource) -> Result<SourceRow, AppError> {
    let row = sqlx::query_as::<_, SourceRow>(
        r#"
        INSERT INTO sources (id, user_id, project_id, name, url, platform, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.project_id)
    .bind(new.name.trim())
    .bind(&new.url)
    .bind(new.platform.as_deref().unwrap_or("web"))
    .bind(new.status.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_source(pool: &PgPool, row: &SourceRow) -> Result<SourceRow, AppError> {
    let row = sqlx::query_as::<_, SourceRow>(
        r#"
        UPDATE sources
        SET name = $1, url = $2, platform = $3, status = $4, updated_at = NOW()
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&row.name)
    .bind(&row.url)
    .bind(&row.platform)
    .bind(&row.status)
    .bind(row.id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_signals(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Option<Uuid>,
) -> Result<Vec<SignalRow>, AppError> {
    let rows = sqlx::query_as::<_, SignalRow>(
        r#"
        SELECT * FROM signals
        WHERE user_id = $1 AND ($2::uuid IS NULL OR project_id = $2)
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_signal(pool: &PgPool, id: Uuid) -> Result<Option<SignalRow>, AppError> {
    let row = sqlx::query_as::<_, SignalRow>("SELECT * FROM signals WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn insert_signal(pool: &PgPool, new: &NewSignal) -> Result<SignalRow, AppError> {
    let row = sqlx::query_as::<_, SignalRow>(
        r#"
        INSERT INTO signals
            (id, user_id, project_id, title, url, platform, category, engagement, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.project_id)
    .bind(new.title.trim())
    .bind(&new.url)
    .bind(new.platform.as_deref().unwrap_or("web"))
    .bind(new.category.as_deref().unwrap_or("general"))
    .bind(new.engagement)
    .bind(new.status.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_signal(pool: &PgPool, row: &SignalRow) -> Result<SignalRow, AppError> {
    let row = sqlx::query_as::<_, SignalRow>(
        r#"
        UPDATE signals
        SET title = $1, category = $2, engagement = $3, status = $4, updated_at = NOW()
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&row.title)
    .bind(&row.category)
    .bind(row.engagement)
    .bind(&row.status)
    .bind(row.id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_validations(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Option<Uuid>,
) -> Result<Vec<HypothesisValidationRow>, AppError> {
    let rows = sqlx::query_as::<_, HypothesisValidationRow>(
        r#"
        SELECT * FROM hypothesis_validations
        WHERE user_id = $1 AND ($2::uuid IS NULL OR project_id = $2)
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_validation(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<HypothesisValidationRow>, AppError> {
    let row = sqlx::query_as::<_, HypothesisValidationRow>(
        "SELECT * FROM hypothesis_validations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn insert_validation(
    pool: &PgPool,
    new: &NewValidation,
) -> Result<HypothesisValidationRow, AppError> {
    let row = sqlx::query_as::<_, HypothesisValidationRow>(
        r#"
        INSERT INTO hypothesis_validations
            (id, user_id, project_id, capture_id, hypothesis, evidence, confidence, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.project_id)
    .bind(new.capture_id)
    .bind(new.hypothesis.trim())
    .bind(&new.evidence)
    .bind(new.confidence)
    .bind(new.status.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_validation(
    pool: &PgPool,
    row: &HypothesisValidationRow,
) -> Result<HypothesisValidationRow, AppError> {
    let row = sqlx::query_as::<_, HypothesisValidationRow>(
        r#"
        UPDATE hypothesis_validations
        SET hypothesis = $1, evidence = $2, confidence = $3, status = $4, updated_at = NOW()
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&row.hypothesis)
    .bind(&row.evidence)
    .bind(row.confidence)
    .bind(&row.status)
    .bind(row.id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn list_moments(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Option<Uuid>,
) -> Result<Vec<CulturalMomentRow>, AppError> {
    let rows = sqlx::query_as::<_, CulturalMomentRow>(
        r#"
        SELECT * FROM cultural_moments
        WHERE user_id = $1 AND ($2::uuid IS NULL OR project_id = $2)
        ORDER BY intensity DESC, created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_moment(pool: &PgPool, id: Uuid) -> Result<Option<CulturalMomentRow>, AppError> {
    let row = sqlx::query_as::<_, CulturalMomentRow>("SELECT * FROM cultural_moments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn insert_moment(pool: &PgPool, new: &NewMoment) -> Result<CulturalMomentRow, AppError> {
    let row = sqlx::query_as::<_, CulturalMomentRow>(
        r#"
        INSERT INTO cultural_moments
            (id, user_id, project_id, title, description, intensity,
             platforms, demographics, duration, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.project_id)
    .bind(new.title.trim())
    .bind(new.description.trim())
    .bind(new.intensity)
    .bind(&new.platforms)
    .bind(&new.demographics)
    .bind(&new.duration)
    .bind(new.status.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_moment(
    pool: &PgPool,
    row: &CulturalMomentRow,
) -> Result<CulturalMomentRow, AppError> {
    let row = sqlx::query_as::<_, CulturalMomentRow>(
        r#"
        UPDATE cultural_moments
        SET title = $1, description = $2, intensity = $3, platforms = $4,
            demographics = $5, duration = $6, status = $7, updated_at = NOW()
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&row.title)
    .bind(&row.description)
    .bind(row.intensity)
    .bind(&row.platforms)
    .bind(&row.demographics)
    .bind(&row.duration)
    .bind(&row.status)
    .bind(row.id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
