//! Markdown rendering of a brief and its supporting evidence.

use serde::Deserialize;
use uuid::Uuid;

use crate::briefs::models::BriefSections;
use crate::captures::models::{Capture, TruthAnalysis};

/// The capture fields an export needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub truth_analysis: Option<TruthAnalysis>,
}

impl From<&Capture> for EvidenceItem {
    fn from(c: &Capture) -> Self {
        Self {
            id: c.id,
            title: c.title.clone(),
            platform: Some(c.platform.clone()),
            truth_analysis: c.truth_analysis.clone(),
        }
    }
}

pub struct BriefDocument<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub sections: &'a BriefSections,
}

/// Renders sections in document order. Sections with neither commentary nor
/// captures are skipped, as are capture ids missing from `evidence`.
pub fn render_brief(doc: &BriefDocument<'_>, evidence: &[EvidenceItem]) -> String {
    let mut md = format!("# {}\n\n", doc.title);

    if let Some(description) = doc.description.filter(|d| !d.trim().is_empty()) {
        md.push_str(&format!("{description}\n\n---\n\n"));
    }

    for (key, section) in doc.sections {
        if section.content.trim().is_empty() && section.captures.is_empty() {
            continue;
        }

        let title = if section.title.trim().is_empty() {
            key.title()
        } else {
            section.title.as_str()
        };
        md.push_str(&format!("## {title}\n\n"));
        if !section.content.trim().is_empty() {
            md.push_str(&format!("{}\n\n", section.content));
        }

        if section.captures.is_empty() {
            continue;
        }
        md.push_str("### Supporting Evidence\n\n");
        for id in &section.captures {
            let Some(item) = evidence.iter().find(|e| e.id == *id) else {
                continue;
            };
            let platform = item
                .platform
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or("Web");
            md.push_str(&format!("- **{}** ({platform})\n", item.title));
            if let Some(truth) = item.truth_analysis.as_ref().and_then(|t| t.excerpt()) {
                md.push_str(&format!("  - Truth: {truth}\n"));
            }
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::briefs::models::{template_sections, BriefTemplate, SectionKey};

    fn evidence(title: &str, platform: Option<&str>, truth: Option<&str>) -> EvidenceItem {
        let truth_analysis = truth.map(|core| {
            let mut t = TruthAnalysis::default();
            t.human_truth.core = core.to_string();
            t
        });
        EvidenceItem {
            id: Uuid::new_v4(),
            title: title.to_string(),
            platform: platform.map(str::to_string),
            truth_analysis,
        }
    }

    #[test]
    fn test_renders_sections_with_evidence() {
        let tiktok = evidence("Late night orders", Some("tiktok"), Some("Hunger is social"));
        let web = evidence("Menu teardown", None, None);

        let mut sections = template_sections(BriefTemplate::JimmyJohns);
        let perf = sections.get_mut(&SectionKey::Performance).unwrap();
        perf.content = "Orders up 12%".to_string();
        perf.captures = vec![tiktok.id, web.id, Uuid::new_v4()];

        let doc = BriefDocument {
            title: "Q3 Brief",
            description: Some("For the sandwich team"),
            sections: &sections,
        };
        let md = render_brief(&doc, &[tiktok, web]);

        assert_eq!(
            md,
            "# Q3 Brief\n\n\
             For the sandwich team\n\n---\n\n\
             ## Performance\n\n\
             Orders up 12%\n\n\
             ### Supporting Evidence\n\n\
             - **Late night orders** (tiktok)\n\
             \x20\x20- Truth: Hunger is social\n\
             - **Menu teardown** (Web)\n\n"
        );
    }

    #[test]
    fn test_empty_sections_are_skipped() {
        let sections = template_sections(BriefTemplate::Dsd);
        let doc = BriefDocument {
            title: "Empty",
            description: None,
            sections: &sections,
        };
        assert_eq!(render_brief(&doc, &[]), "# Empty\n\n");
    }

    #[test]
    fn test_sections_follow_document_order() {
        let mut sections = template_sections(BriefTemplate::Dsd);
        for (key, text) in [
            (SectionKey::Deliver, "c"),
            (SectionKey::Define, "a"),
            (SectionKey::Shift, "b"),
        ] {
            sections.get_mut(&key).unwrap().content = text.to_string();
        }
        let doc = BriefDocument {
            title: "T",
            description: None,
            sections: &sections,
        };
        let md = render_brief(&doc, &[]);
        let define = md.find("## Define").unwrap();
        let shift = md.find("## Shift").unwrap();
        let deliver = md.find("## Deliver").unwrap();
        assert!(define < shift && shift < deliver);
    }
}
