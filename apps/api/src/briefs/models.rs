use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every section key any template can use. Declaration order is export order,
/// so iterating a `BriefSections` map walks sections in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKey {
    Performance,
    CulturalSignals,
    PlatformSignals,
    Opportunities,
    Cohorts,
    Ideation,
    Define,
    Shift,
    Deliver,
}

impl SectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Performance => "performance",
            SectionKey::CulturalSignals => "cultural-signals",
            SectionKey::PlatformSignals => "platform-signals",
            SectionKey::Opportunities => "opportunities",
            SectionKey::Cohorts => "cohorts",
            SectionKey::Ideation => "ideation",
            SectionKey::Define => "define",
            SectionKey::Shift => "shift",
            SectionKey::Deliver => "deliver",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionKey::Performance => "Performance",
            SectionKey::CulturalSignals => "Cultural Signals",
            SectionKey::PlatformSignals => "Platform Signals",
            SectionKey::Opportunities => "Opportunities",
            SectionKey::Cohorts => "Cohorts",
            SectionKey::Ideation => "Ideation",
            SectionKey::Define => "Define",
            SectionKey::Shift => "Shift",
            SectionKey::Deliver => "Deliver",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "performance" => Ok(SectionKey::Performance),
            "cultural-signals" => Ok(SectionKey::CulturalSignals),
            "platform-signals" => Ok(SectionKey::PlatformSignals),
            "opportunities" => Ok(SectionKey::Opportunities),
            "cohorts" => Ok(SectionKey::Cohorts),
            "ideation" => Ok(SectionKey::Ideation),
            "define" => Ok(SectionKey::Define),
            "shift" => Ok(SectionKey::Shift),
            "deliver" => Ok(SectionKey::Deliver),
            other => Err(format!("unknown section '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BriefTemplate {
    #[default]
    #[serde(rename = "jimmy-johns")]
    JimmyJohns,
    #[serde(rename = "dsd")]
    Dsd,
}

impl BriefTemplate {
    pub const ALL: [BriefTemplate; 2] = [BriefTemplate::JimmyJohns, BriefTemplate::Dsd];

    pub fn as_str(&self) -> &'static str {
        match self {
            BriefTemplate::JimmyJohns => "jimmy-johns",
            BriefTemplate::Dsd => "dsd",
        }
    }

    pub fn sections(&self) -> &'static [SectionKey] {
        match self {
            BriefTemplate::JimmyJohns => &[
                SectionKey::Performance,
                SectionKey::CulturalSignals,
                SectionKey::PlatformSignals,
                SectionKey::Opportunities,
                SectionKey::Cohorts,
                SectionKey::Ideation,
            ],
            BriefTemplate::Dsd => &[SectionKey::Define, SectionKey::Shift, SectionKey::Deliver],
        }
    }

    pub fn has_section(&self, key: SectionKey) -> bool {
        self.sections().contains(&key)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BriefTemplate::JimmyJohns => "Jimmy John's Culture Brief",
            BriefTemplate::Dsd => "Define / Shift / Deliver",
        }
    }
}

/// Catalog entry describing a template to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateInfo {
    pub id: BriefTemplate,
    pub name: &'static str,
    pub sections: Vec<TemplateSectionInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateSectionInfo {
    pub key: SectionKey,
    pub title: &'static str,
}

pub fn template_catalog() -> Vec<TemplateInfo> {
    BriefTemplate::ALL
        .iter()
        .map(|template| TemplateInfo {
            id: *template,
            name: template.name(),
            sections: template
                .sections()
                .iter()
                .map(|key| TemplateSectionInfo {
                    key: *key,
                    title: key.title(),
                })
                .collect(),
        })
        .collect()
}

impl FromStr for BriefTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jimmy-johns" => Ok(BriefTemplate::JimmyJohns),
            "dsd" => Ok(BriefTemplate::Dsd),
            other => Err(format!("unknown brief template '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BriefStatus {
    #[default]
    Draft,
    Review,
    Final,
    Delivered,
}

impl BriefStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BriefStatus::Draft => "draft",
            BriefStatus::Review => "review",
            BriefStatus::Final => "final",
            BriefStatus::Delivered => "delivered",
        }
    }
}

impl FromStr for BriefStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BriefStatus::Draft),
            "review" => Ok(BriefStatus::Review),
            "final" => Ok(BriefStatus::Final),
            "delivered" => Ok(BriefStatus::Delivered),
            other => Err(format!("unknown brief status '{other}'")),
        }
    }
}

/// Commentary plus the ordered capture ids assigned to one section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BriefSection {
    pub title: String,
    pub content: String,
    /// List order is display and export order.
    pub captures: Vec<Uuid>,
}

impl BriefSection {
    pub fn empty(key: SectionKey) -> Self {
        Self {
            title: key.title().to_string(),
            content: String::new(),
            captures: vec![],
        }
    }
}

pub type BriefSections = BTreeMap<SectionKey, BriefSection>;

/// Builds the empty section map for a template.
pub fn template_sections(template: BriefTemplate) -> BriefSections {
    template
        .sections()
        .iter()
        .map(|&key| (key, BriefSection::empty(key)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub template: BriefTemplate,
    pub status: BriefStatus,
    pub sections: BriefSections,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn brief(template: BriefTemplate) -> Brief {
        let now = Utc::now();
        Brief {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            title: "Q3 Culture Brief".to_string(),
            description: None,
            template,
            status: BriefStatus::Draft,
            sections: template_sections(template),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_sections_in_document_order() {
        let keys: Vec<_> = template_sections(BriefTemplate::JimmyJohns)
            .into_keys()
            .collect();
        assert_eq!(keys, BriefTemplate::JimmyJohns.sections());
    }

    #[test]
    fn test_dsd_template_has_three_sections() {
        let sections = template_sections(BriefTemplate::Dsd);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[&SectionKey::Shift].title, "Shift");
        assert!(!BriefTemplate::Dsd.has_section(SectionKey::Ideation));
    }

    #[test]
    fn test_template_catalog_lists_sections_in_order() {
        let json = serde_json::to_value(template_catalog()).unwrap();
        assert_eq!(json[0]["id"], "jimmy-johns");
        assert_eq!(json[0]["sections"].as_array().unwrap().len(), 6);
        assert_eq!(json[0]["sections"][1]["key"], "cultural-signals");
        assert_eq!(json[0]["sections"][1]["title"], "Cultural Signals");

        let dsd: Vec<_> = json[1]["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["key"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(json[1]["id"], "dsd");
        assert_eq!(dsd, ["define", "shift", "deliver"]);
    }

    #[test]
    fn test_sections_serialize_with_kebab_keys() {
        let json = serde_json::to_value(template_sections(BriefTemplate::JimmyJohns)).unwrap();
        assert!(json.get("cultural-signals").is_some());
        assert_eq!(json["performance"]["captures"], serde_json::json!([]));
    }

    #[test]
    fn test_section_key_round_trips_through_str() {
        for key in BriefTemplate::JimmyJohns.sections() {
            assert_eq!(key.as_str().parse::<SectionKey>().unwrap(), *key);
        }
    }
}
