//! Brief export: format negotiation, download naming and S3 archiving.
//!
//! Markdown renders in-process. PDF and slides need an external renderer.

use std::str::FromStr;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::brief::BriefExportRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Pdf,
    Slides,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Slides => "slides",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Slides => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Slides => "pptx",
        }
    }

    /// Only markdown is produced here; the others are inputs for an external renderer.
    pub fn ensure_renderable(&self) -> Result<(), AppError> {
        match self {
            ExportFormat::Markdown => Ok(()),
            other => Err(AppError::NotImplemented(format!(
                "{} export requires the external renderer",
                other.as_str()
            ))),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(ExportFormat::Markdown),
            "pdf" => Ok(ExportFormat::Pdf),
            "slides" => Ok(ExportFormat::Slides),
            other => Err(format!("Invalid export format '{other}'")),
        }
    }
}

/// `<title>.<ext>` with every run of whitespace collapsed to a single `-`.
/// Control characters are dropped since they are not valid in a header value.
pub fn export_filename(title: &str, format: ExportFormat) -> String {
    let stem = title
        .split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let stem = if stem.is_empty() { "brief".to_string() } else { stem };
    format!("{stem}.{}", format.extension())
}

pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename.replace('"', ""))
}

pub fn archive_key(brief_id: Uuid, at: DateTime<Utc>, format: ExportFormat) -> String {
    format!(
        "briefs/{brief_id}/{}.{}",
        at.format("%Y%m%dT%H%M%SZ"),
        format.extension()
    )
}

/// Uploads a rendered export and records it in the brief's export history.
pub async fn archive_export(
    pool: &PgPool,
    s3: &S3Client,
    bucket: &str,
    brief_id: Uuid,
    format: ExportFormat,
    body: Bytes,
) -> Result<BriefExportRow, AppError> {
    let s3_key = archive_key(brief_id, Utc::now(), format);

    s3.put_object()
        .bucket(bucket)
        .key(&s3_key)
        .body(ByteStream::from(body))
        .content_type(format.content_type())
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Export upload failed: {e}")))?;

    info!("Archived brief export to s3://{bucket}/{s3_key}");

    let row = sqlx::query_as::<_, BriefExportRow>(
        r#"
        INSERT INTO brief_exports (id, brief_id, format, s3_key)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(brief_id)
    .bind(format.as_str())
    .bind(&s3_key)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn list_exports(pool: &PgPool, brief_id: Uuid) -> Result<Vec<BriefExportRow>, AppError> {
    let rows = sqlx::query_as::<_, BriefExportRow>(
        "SELECT * FROM brief_exports WHERE brief_id = $1 ORDER BY created_at DESC",
    )
    .bind(brief_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_filename_collapses_whitespace_runs() {
        assert_eq!(
            export_filename("Q3  Culture\tBrief", ExportFormat::Markdown),
            "Q3-Culture-Brief.md"
        );
        assert_eq!(export_filename("Deck", ExportFormat::Slides), "Deck.pptx");
        assert_eq!(export_filename("   ", ExportFormat::Pdf), "brief.pdf");
    }

    #[test]
    fn test_filename_drops_control_characters() {
        assert_eq!(
            export_filename("Q3\u{1}  Brief\u{7f}", ExportFormat::Markdown),
            "Q3-Brief.md"
        );
        assert_eq!(export_filename("\u{1} \u{1b}", ExportFormat::Pdf), "brief.pdf");
    }

    #[test]
    fn test_content_disposition_strips_quotes() {
        assert_eq!(
            content_disposition("say-\"hi\".md"),
            "attachment; filename=\"say-hi.md\""
        );
    }

    #[test]
    fn test_only_markdown_renders_in_process() {
        assert!(ExportFormat::Markdown.ensure_renderable().is_ok());
        assert!(matches!(
            ExportFormat::Pdf.ensure_renderable(),
            Err(AppError::NotImplemented(_))
        ));
        assert!(ExportFormat::Slides.ensure_renderable().is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!("docx".parse::<ExportFormat>().is_err());
        assert_eq!("pdf".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
    }

    #[test]
    fn test_archive_key_layout() {
        let id = Uuid::nil();
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(
            archive_key(id, at, ExportFormat::Markdown),
            "briefs/00000000-0000-0000-0000-000000000000/20250309T140500Z.md"
        );
    }
}
