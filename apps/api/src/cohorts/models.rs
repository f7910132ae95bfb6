use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cohorts::pillars::{find_pillar, DEFAULT_PILLAR};

/// A user-authored audience segment. Session-scoped, never linked to captures or briefs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cohort {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub pillar: String,
    pub characteristics: Vec<String>,
    pub size: String,
    pub behavior: String,
    pub platforms: Vec<String>,
    pub opportunity: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCohort {
    pub name: String,
    pub description: String,
    pub pillar: Option<String>,
    pub characteristics: Vec<String>,
    pub size: String,
    pub behavior: String,
    pub platforms: Vec<String>,
    pub opportunity: String,
}

impl NewCohort {
    /// Checks required fields and the pillar id, then assigns an id.
    pub fn into_cohort(self) -> Result<Cohort, String> {
        let name = self.name.trim();
        let description = self.description.trim();
        if name.is_empty() || description.is_empty() {
            return Err("cohort needs a name and a description".to_string());
        }

        let pillar = self.pillar.unwrap_or_else(|| DEFAULT_PILLAR.to_string());
        if find_pillar(&pillar).is_none() {
            return Err(format!("unknown pillar '{pillar}'"));
        }

        Ok(Cohort {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            pillar,
            characteristics: clean_list(self.characteristics),
            size: self.size.trim().to_string(),
            behavior: self.behavior.trim().to_string(),
            platforms: clean_list(self.platforms),
            opportunity: self.opportunity.trim().to_string(),
        })
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_name_and_description() {
        let missing = NewCohort {
            name: "Night owls".to_string(),
            ..Default::default()
        };
        assert!(missing.into_cohort().is_err());
    }

    #[test]
    fn test_defaults_pillar_and_cleans_lists() {
        let cohort = NewCohort {
            name: " Night owls ".to_string(),
            description: "Order after midnight".to_string(),
            characteristics: vec!["students".into(), "  ".into()],
            ..Default::default()
        }
        .into_cohort()
        .unwrap();

        assert_eq!(cohort.name, "Night owls");
        assert_eq!(cohort.pillar, "1p-data");
        assert_eq!(cohort.characteristics, vec!["students"]);
    }

    #[test]
    fn test_rejects_unknown_pillar() {
        let result = NewCohort {
            name: "A".to_string(),
            description: "B".to_string(),
            pillar: Some("vibes".to_string()),
            ..Default::default()
        }
        .into_cohort();
        assert_eq!(result.unwrap_err(), "unknown pillar 'vibes'");
    }
}
