use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::captures::filter::Choice;
use crate::models::double_option;
use crate::models::signals::{CulturalMomentRow, HypothesisValidationRow, SignalRow, SourceRow};

pub const MAX_INTENSITY: i32 = 10;

// ────────────────────────────────────────────────────────────────────────────
// Status enums
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    #[default]
    Active,
    Paused,
    Error,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Active => "active",
            SourceStatus::Paused => "paused",
            SourceStatus::Error => "error",
        }
    }
}

/// Promotion path: capture → potential signal → signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    #[default]
    Capture,
    PotentialSignal,
    Signal,
}

impl SignalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Capture => "capture",
            SignalStatus::PotentialSignal => "potential_signal",
            SignalStatus::Signal => "signal",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Validated,
    Refuted,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pending => "pending",
            ValidationStatus::Validated => "validated",
            ValidationStatus::Refuted => "refuted",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentStatus {
    #[default]
    Emerging,
    Peaking,
    Fading,
}

impl MomentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MomentStatus::Emerging => "emerging",
            MomentStatus::Peaking => "peaking",
            MomentStatus::Fading => "fading",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Create / patch payloads
// ────────────────────────────────────────────────────────────────────────────

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    Ok(())
}

fn check_intensity(intensity: i32) -> Result<(), String> {
    if !(0..=MAX_INTENSITY).contains(&intensity) {
        return Err(format!("intensity must be between 0 and {MAX_INTENSITY}"));
    }
    Ok(())
}

fn check_confidence(confidence: Option<f64>) -> Result<(), String> {
    match confidence {
        Some(c) if !(0.0..=1.0).contains(&c) => {
            Err("confidence must be between 0 and 1".to_string())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSource {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub url: Option<String>,
    pub platform: Option<String>,
    #[serde(default)]
    pub status: SourceStatus,
}

impl NewSource {
    pub fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    pub platform: Option<String>,
    pub status: Option<SourceStatus>,
}

impl SourcePatch {
    pub fn apply(self, row: &mut SourceRow) -> Result<(), String> {
        if let Some(name) = self.name {
            require_text("name", &name)?;
            row.name = name;
        }
        if let Some(url) = self.url {
            row.url = url;
        }
        if let Some(platform) = self.platform {
            row.platform = platform;
        }
        if let Some(status) = self.status {
            row.status = status.as_str().to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignal {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    pub url: Option<String>,
    pub platform: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub engagement: i64,
    #[serde(default)]
    pub status: SignalStatus,
}

impl NewSignal {
    pub fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        if self.engagement < 0 {
            return Err("engagement cannot be negative".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub engagement: Option<i64>,
    pub status: Option<SignalStatus>,
}

impl SignalPatch {
    pub fn apply(self, row: &mut SignalRow) -> Result<(), String> {
        if let Some(title) = self.title {
            require_text("title", &title)?;
            row.title = title;
        }
        if let Some(category) = self.category {
            row.category = category;
        }
        if let Some(engagement) = self.engagement {
            if engagement < 0 {
                return Err("engagement cannot be negative".to_string());
            }
            row.engagement = engagement;
        }
        if let Some(status) = self.status {
            row.status = status.as_str().to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewValidation {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub capture_id: Option<Uuid>,
    #[serde(default)]
    pub hypothesis: String,
    pub evidence: Option<String>,
    pub confidence: Option<f64>,
    #[serde(default)]
    pub status: ValidationStatus,
}

impl NewValidation {
    pub fn validate(&self) -> Result<(), String> {
        require_text("hypothesis", &self.hypothesis)?;
        check_confidence(self.confidence)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationPatch {
    pub hypothesis: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub evidence: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub confidence: Option<Option<f64>>,
    pub status: Option<ValidationStatus>,
}

impl ValidationPatch {
    pub fn apply(self, row: &mut HypothesisValidationRow) -> Result<(), String> {
        if let Some(hypothesis) = self.hypothesis {
            require_text("hypothesis", &hypothesis)?;
            row.hypothesis = hypothesis;
        }
        if let Some(evidence) = self.evidence {
            row.evidence = evidence;
        }
        if let Some(confidence) = self.confidence {
            check_confidence(confidence)?;
            row.confidence = confidence;
        }
        if let Some(status) = self.status {
            row.status = status.as_str().to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMoment {
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub intensity: i32,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub demographics: Vec<String>,
    pub duration: Option<String>,
    #[serde(default)]
    pub status: MomentStatus,
}

impl NewMoment {
    pub fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        check_intensity(self.intensity)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub intensity: Option<i32>,
    pub platforms: Option<Vec<String>>,
    pub demographics: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub duration: Option<Option<String>>,
    pub status: Option<MomentStatus>,
}

impl MomentPatch {
    pub fn apply(self, row: &mut CulturalMomentRow) -> Result<(), String> {
        if let Some(title) = self.title {
            require_text("title", &title)?;
            row.title = title;
        }
        if let Some(description) = self.description {
            require_text("description", &description)?;
            row.description = description;
        }
        if let Some(intensity) = self.intensity {
            check_intensity(intensity)?;
            row.intensity = intensity;
        }
        if let Some(platforms) = self.platforms {
            row.platforms = platforms;
        }
        if let Some(demographics) = self.demographics {
            row.demographics = demographics;
        }
        if let Some(duration) = self.duration {
            row.duration = duration;
        }
        if let Some(status) = self.status {
            row.status = status.as_str().to_string();
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trending view
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSort {
    #[default]
    Created,
    /// Highest engagement first.
    Engagement,
}

/// Applies the category filter and the requested order. Ties keep input order.
pub fn arrange_signals(
    signals: Vec<SignalRow>,
    category: &Choice<String>,
    sort: SignalSort,
) -> Vec<SignalRow> {
    let mut signals: Vec<SignalRow> = signals
        .into_iter()
        .filter(|s| match category {
            Choice::All => true,
            Choice::Only(c) => s.category.eq_ignore_ascii_case(c),
        })
        .collect();
    if sort == SignalSort::Engagement {
        signals.sort_by(|a, b| b.engagement.cmp(&a.engagement));
    }
    signals
}
