//! AI-assisted section commentary.
//!
//! The model only writes `content`. Titles and capture lists are never touched,
//! and an empty or missing answer for a section keeps the existing text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::briefs::models::{BriefSections, SectionKey};
use crate::briefs::prompts::{BRIEF_WRITER_SYSTEM, GENERATE_BRIEF_PROMPT};
use crate::captures::models::{Capture, TruthAnalysis};
use crate::errors::AppError;
use crate::llm_client::prompts::EVIDENCE_INSTRUCTION;
use crate::llm_client::LlmClient;

/// What the model sees of each capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureInsight {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub truth_analysis: Option<TruthAnalysis>,
}

impl From<&Capture> for CaptureInsight {
    fn from(c: &Capture) -> Self {
        Self {
            title: c.title.clone(),
            content: c.content.clone(),
            platform: Some(c.platform.clone()),
            truth_analysis: c.truth_analysis.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeneratedSection {
    pub content: String,
}

fn section_purpose(key: SectionKey) -> &'static str {
    match key {
        SectionKey::Performance => "key metrics and results that matter",
        SectionKey::CulturalSignals => "emerging cultural trends and behaviors",
        SectionKey::PlatformSignals => "platform-specific trends and features",
        SectionKey::Opportunities => "strategic opportunities to pursue",
        SectionKey::Cohorts => "target audience segments",
        SectionKey::Ideation => "creative concepts and ideas",
        SectionKey::Define => "who the audience is and what they actually do",
        SectionKey::Shift => "the strategic insight and human truth that changes the approach",
        SectionKey::Deliver => "creative territories and executions that earn attention",
    }
}

pub fn build_prompt(
    title: &str,
    description: Option<&str>,
    sections: &BriefSections,
    captures: &[CaptureInsight],
) -> Result<String, AppError> {
    let section_guide = sections
        .keys()
        .map(|k| format!("- {}: {}", k.as_str(), section_purpose(*k)))
        .collect::<Vec<_>>()
        .join("\n");
    let captures_json =
        serde_json::to_string_pretty(captures).map_err(|e| AppError::Internal(e.into()))?;
    let sections_json =
        serde_json::to_string_pretty(sections).map_err(|e| AppError::Internal(e.into()))?;

    Ok(GENERATE_BRIEF_PROMPT
        .replace("{title}", title)
        .replace("{description}", description.unwrap_or("(none)"))
        .replace("{captures}", &captures_json)
        .replace("{section_guide}", &section_guide)
        .replace("{sections}", &sections_json)
        .replace("{evidence_instruction}", EVIDENCE_INSTRUCTION))
}

/// Copies non-empty generated content into existing sections. Keys the brief
/// doesn't have are ignored.
pub fn merge_generated(sections: &mut BriefSections, generated: BTreeMap<String, GeneratedSection>) {
    for (raw_key, section) in generated {
        let Ok(key) = raw_key.parse::<SectionKey>() else {
            debug!("Ignoring generated content for unknown section '{raw_key}'");
            continue;
        };
        let content = section.content.trim();
        if content.is_empty() {
            continue;
        }
        if let Some(existing) = sections.get_mut(&key) {
            existing.content = content.to_string();
        }
    }
}

/// Asks the model for section commentary and returns the merged sections.
pub async fn generate_sections(
    llm: &LlmClient,
    title: &str,
    description: Option<&str>,
    mut sections: BriefSections,
    captures: &[CaptureInsight],
) -> Result<BriefSections, AppError> {
    let prompt = build_prompt(title, description, &sections, captures)?;
    let generated: BTreeMap<String, GeneratedSection> = llm
        .call_json(&prompt, BRIEF_WRITER_SYSTEM)
        .await
        .map_err(|e| AppError::from_llm("Brief generation failed", e))?;

    info!(
        "Generated commentary for {} of {} sections",
        generated.len(),
        sections.len()
    );
    merge_generated(&mut sections, generated);
    Ok(sections)
}
