//! Markdown cohort report, downloaded as `cohort-analysis-report.md`.

use chrono::NaiveDate;

use crate::cohorts::models::Cohort;
use crate::cohorts::pillars::find_pillar;

pub const REPORT_FILENAME: &str = "cohort-analysis-report.md";

fn or_unspecified(s: &str) -> &str {
    if s.trim().is_empty() {
        "Not specified"
    } else {
        s
    }
}

pub fn render_cohort_report(cohorts: &[Cohort], generated_on: NaiveDate) -> String {
    let mut md = format!(
        "# Cohort Analysis Report\n*Generated {}*\n\n\
         ## Cohort Framework: Seven Pillars Methodology\n\n\
         This analysis identifies {} strategic audience cohorts across the seven pillars framework.\n",
        generated_on.format("%Y-%m-%d"),
        cohorts.len()
    );

    for cohort in cohorts {
        let pillar = find_pillar(&cohort.pillar).map_or("Unknown", |p| p.name);
        md.push_str(&format!(
            "\n## {}\n**Pillar:** {pillar}\n**Description:** {}\n\n**Key Characteristics:**\n",
            cohort.name, cohort.description
        ));
        for c in &cohort.characteristics {
            md.push_str(&format!("- {c}\n"));
        }
        md.push_str(&format!(
            "\n**Behavioral Patterns:** {}\n**Estimated Size:** {}\n**Primary Platforms:** {}\n**Strategic Opportunity:** {}\n\n---\n",
            or_unspecified(&cohort.behavior),
            or_unspecified(&cohort.size),
            or_unspecified(&cohort.platforms.join(", ")),
            or_unspecified(&cohort.opportunity),
        ));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_report_lists_each_cohort_with_pillar_name() {
        let cohort = Cohort {
            id: Uuid::new_v4(),
            name: "Night owls".to_string(),
            description: "Order after midnight".to_string(),
            pillar: "lifestage".to_string(),
            characteristics: vec!["students".to_string()],
            size: "2M".to_string(),
            behavior: String::new(),
            platforms: vec!["tiktok".to_string(), "reddit".to_string()],
            opportunity: String::new(),
        };
        let date = NaiveDate::from_ymd_opt(2025, 8, 21).unwrap();
        let md = render_cohort_report(&[cohort], date);

        assert!(md.starts_with("# Cohort Analysis Report\n*Generated 2025-08-21*"));
        assert!(md.contains("identifies 1 strategic"));
        assert!(md.contains("## Night owls\n**Pillar:** Life Lens\n"));
        assert!(md.contains("- students\n"));
        assert!(md.contains("**Behavioral Patterns:** Not specified\n"));
        assert!(md.contains("**Primary Platforms:** tiktok, reddit\n"));
    }
}
