use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::briefs::models::{Brief, BriefSections};
use crate::errors::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct BriefRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub template: String,
    pub status: String,
    pub sections: Json<BriefSections>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BriefRow> for Brief {
    type Error = AppError;

    fn try_from(row: BriefRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = move |e: String| AppError::Internal(anyhow::anyhow!("brief {id}: {e}"));
        Ok(Brief {
            id: row.id,
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            template: row.template.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            sections: row.sections.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// One archived export of a brief.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BriefExportRow {
    pub id: Uuid,
    pub brief_id: Uuid,
    pub format: String,
    pub s3_key: String,
    pub created_at: DateTime<Utc>,
}
