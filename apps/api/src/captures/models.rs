use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureType {
    Screenshot,
    Text,
    Url,
    VideoFrame,
    Thread,
}

impl CaptureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureType::Screenshot => "screenshot",
            CaptureType::Text => "text",
            CaptureType::Url => "url",
            CaptureType::VideoFrame => "video-frame",
            CaptureType::Thread => "thread",
        }
    }
}

impl FromStr for CaptureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "screenshot" => Ok(CaptureType::Screenshot),
            "text" => Ok(CaptureType::Text),
            "url" => Ok(CaptureType::Url),
            "video-frame" => Ok(CaptureType::VideoFrame),
            "thread" => Ok(CaptureType::Thread),
            other => Err(format!("unknown capture type '{other}'")),
        }
    }
}

/// Enrichment lifecycle: pending → processing → analyzed | error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    Pending,
    Processing,
    Analyzed,
    Error,
}

impl CaptureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureStatus::Pending => "pending",
            CaptureStatus::Processing => "processing",
            CaptureStatus::Analyzed => "analyzed",
            CaptureStatus::Error => "error",
        }
    }
}

impl FromStr for CaptureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CaptureStatus::Pending),
            "processing" => Ok(CaptureStatus::Processing),
            "analyzed" => Ok(CaptureStatus::Analyzed),
            "error" => Ok(CaptureStatus::Error),
            other => Err(format!("unknown capture status '{other}'")),
        }
    }
}

/// The three Define / Shift / Deliver stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DsdSection {
    Define,
    Shift,
    Deliver,
}

impl DsdSection {
    pub const ALL: [DsdSection; 3] = [DsdSection::Define, DsdSection::Shift, DsdSection::Deliver];

    pub fn as_str(&self) -> &'static str {
        match self {
            DsdSection::Define => "define",
            DsdSection::Shift => "shift",
            DsdSection::Deliver => "deliver",
        }
    }

    /// The three tags owned by this section.
    pub fn tags(&self) -> [DsdTag; 3] {
        match self {
            DsdSection::Define => [DsdTag::LifeLens, DsdTag::RawBehavior, DsdTag::ChannelVibes],
            DsdSection::Shift => [
                DsdTag::StrategicIntelligence,
                DsdTag::HumanTruth,
                DsdTag::CulturalMoment,
            ],
            DsdSection::Deliver => [
                DsdTag::CreativeTerritory,
                DsdTag::ExecutionIdea,
                DsdTag::AttentionValue,
            ],
        }
    }
}

impl fmt::Display for DsdSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DsdSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "define" => Ok(DsdSection::Define),
            "shift" => Ok(DsdSection::Shift),
            "deliver" => Ok(DsdSection::Deliver),
            other => Err(format!("unknown DSD section '{other}'")),
        }
    }
}

/// The fixed nine-tag DSD vocabulary, declared in section order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DsdTag {
    LifeLens,
    RawBehavior,
    ChannelVibes,
    StrategicIntelligence,
    HumanTruth,
    CulturalMoment,
    CreativeTerritory,
    ExecutionIdea,
    AttentionValue,
}

impl DsdTag {
    pub const ALL: [DsdTag; 9] = [
        DsdTag::LifeLens,
        DsdTag::RawBehavior,
        DsdTag::ChannelVibes,
        DsdTag::StrategicIntelligence,
        DsdTag::HumanTruth,
        DsdTag::CulturalMoment,
        DsdTag::CreativeTerritory,
        DsdTag::ExecutionIdea,
        DsdTag::AttentionValue,
    ];

    pub fn section(&self) -> DsdSection {
        match self {
            DsdTag::LifeLens | DsdTag::RawBehavior | DsdTag::ChannelVibes => DsdSection::Define,
            DsdTag::StrategicIntelligence | DsdTag::HumanTruth | DsdTag::CulturalMoment => {
                DsdSection::Shift
            }
            DsdTag::CreativeTerritory | DsdTag::ExecutionIdea | DsdTag::AttentionValue => {
                DsdSection::Deliver
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DsdTag::LifeLens => "lifeLens",
            DsdTag::RawBehavior => "rawBehavior",
            DsdTag::ChannelVibes => "channelVibes",
            DsdTag::StrategicIntelligence => "strategicIntelligence",
            DsdTag::HumanTruth => "humanTruth",
            DsdTag::CulturalMoment => "culturalMoment",
            DsdTag::CreativeTerritory => "creativeTerritory",
            DsdTag::ExecutionIdea => "executionIdea",
            DsdTag::AttentionValue => "attentionValue",
        }
    }
}

impl FromStr for DsdTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DsdTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("unknown DSD tag '{s}'"))
    }
}

/// One boolean flag per DSD tag. Missing keys deserialize as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DsdTags {
    pub life_lens: bool,
    pub raw_behavior: bool,
    pub channel_vibes: bool,
    pub strategic_intelligence: bool,
    pub human_truth: bool,
    pub cultural_moment: bool,
    pub creative_territory: bool,
    pub execution_idea: bool,
    pub attention_value: bool,
}

impl DsdTags {
    pub fn get(&self, tag: DsdTag) -> bool {
        match tag {
            DsdTag::LifeLens => self.life_lens,
            DsdTag::RawBehavior => self.raw_behavior,
            DsdTag::ChannelVibes => self.channel_vibes,
            DsdTag::StrategicIntelligence => self.strategic_intelligence,
            DsdTag::HumanTruth => self.human_truth,
            DsdTag::CulturalMoment => self.cultural_moment,
            DsdTag::CreativeTerritory => self.creative_territory,
            DsdTag::ExecutionIdea => self.execution_idea,
            DsdTag::AttentionValue => self.attention_value,
        }
    }

    pub fn set(&mut self, tag: DsdTag, value: bool) {
        let flag = match tag {
            DsdTag::LifeLens => &mut self.life_lens,
            DsdTag::RawBehavior => &mut self.raw_behavior,
            DsdTag::ChannelVibes => &mut self.channel_vibes,
            DsdTag::StrategicIntelligence => &mut self.strategic_intelligence,
            DsdTag::HumanTruth => &mut self.human_truth,
            DsdTag::CulturalMoment => &mut self.cultural_moment,
            DsdTag::CreativeTerritory => &mut self.creative_territory,
            DsdTag::ExecutionIdea => &mut self.execution_idea,
            DsdTag::AttentionValue => &mut self.attention_value,
        };
        *flag = value;
    }

    pub fn enabled(&self) -> Vec<DsdTag> {
        DsdTag::ALL.into_iter().filter(|t| self.get(*t)).collect()
    }

    pub fn any_in(&self, section: DsdSection) -> bool {
        section.tags().into_iter().any(|t| self.get(t))
    }
}

/// Partial tag map used by patches and AI suggestions. Only the keys present are applied.
pub type DsdTagPatch = BTreeMap<DsdTag, bool>;

// ────────────────────────────────────────────────────────────────────────────
// Truth Analysis: the four-layer contract filled by the external analyzer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactLayer {
    pub claims: Vec<String>,
    pub metrics: BTreeMap<String, f64>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservationLayer {
    pub patterns: Vec<String>,
    pub behaviors: Vec<String>,
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightLayer {
    pub implications: Vec<String>,
    pub opportunities: Vec<String>,
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HumanTruthLayer {
    pub core: String,
    pub emotional: String,
    pub cultural: String,
    pub psychological: String,
}

/// All four layers are always present; an absent layer from the analyzer is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TruthAnalysis {
    pub fact: FactLayer,
    pub observation: ObservationLayer,
    pub insight: InsightLayer,
    pub human_truth: HumanTruthLayer,
}

impl TruthAnalysis {
    /// Short excerpt used in brief manifests: the core human truth, if any.
    pub fn excerpt(&self) -> Option<&str> {
        let core = self.human_truth.core.trim();
        (!core.is_empty()).then_some(core)
    }
}

/// A single piece of captured content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub capture_type: CaptureType,
    pub platform: String,
    pub title: String,
    pub content: String,
    pub source_url: Option<String>,
    pub screenshot_ref: Option<String>,
    pub user_note: Option<String>,
    pub workspace_notes: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub dsd_tags: DsdTags,
    pub dsd_section: Option<DsdSection>,
    pub truth_analysis: Option<TruthAnalysis>,
    pub viral_score: Option<f64>,
    pub cultural_relevance: Option<f64>,
    pub status: CaptureStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn capture(title: &str, content: &str) -> Capture {
        let now = Utc::now();
        Capture {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            user_id: Uuid::nil(),
            capture_type: CaptureType::Text,
            platform: "web".to_string(),
            title: title.to_string(),
            content: content.to_string(),
            source_url: None,
            screenshot_ref: None,
            user_note: None,
            workspace_notes: None,
            summary: None,
            tags: vec![],
            dsd_tags: DsdTags::default(),
            dsd_section: None,
            truth_analysis: None,
            viral_score: None,
            cultural_relevance: None,
            status: CaptureStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
