//! AI tag suggestion. The model proposes a partial tag map that is merged,
//! never substituted, into the capture's existing flags.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::captures::models::{Capture, DsdTag, DsdTagPatch};
use crate::captures::prompts::{TAG_SUGGESTION_PROMPT, TAG_SUGGESTION_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::DSD_FRAMEWORK;
use crate::llm_client::LlmClient;

pub async fn suggest_tags(llm: &LlmClient, capture: &Capture) -> Result<DsdTagPatch, AppError> {
    let prompt = TAG_SUGGESTION_PROMPT
        .replace("{framework}", DSD_FRAMEWORK)
        .replace("{title}", &capture.title)
        .replace("{platform}", &capture.platform)
        .replace("{content}", &capture.content)
        .replace("{note}", capture.user_note.as_deref().unwrap_or("(none)"));

    let raw: BTreeMap<String, Value> = llm
        .call_json(&prompt, TAG_SUGGESTION_SYSTEM)
        .await
        .map_err(|e| AppError::from_llm("Tag suggestion failed", e))?;

    Ok(suggestion_to_patch(raw))
}

/// Keeps only known tag names with boolean values. Anything else the model
/// invents is dropped rather than failing the whole suggestion.
pub fn suggestion_to_patch(raw: BTreeMap<String, Value>) -> DsdTagPatch {
    raw.into_iter()
        .filter_map(|(key, value)| match (key.parse::<DsdTag>(), value.as_bool()) {
            (Ok(tag), Some(flag)) => Some((tag, flag)),
            _ => {
                debug!("Ignoring suggested tag entry '{key}'");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures::models::fixtures::capture;
    use crate::captures::models::DsdSection;
    use crate::captures::tagging::merge_tags;
    use serde_json::json;

    fn raw(value: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unknown_and_non_boolean_entries_are_dropped() {
        let patch = suggestion_to_patch(raw(json!({
            "humanTruth": true,
            "vibes": true,
            "executionIdea": "yes",
            "rawBehavior": false
        })));
        assert_eq!(patch.len(), 2);
        assert_eq!(patch[&DsdTag::HumanTruth], true);
        assert_eq!(patch[&DsdTag::RawBehavior], false);
    }

    #[test]
    fn test_suggestion_merges_into_existing_tags() {
        let mut c = capture("X", "...");
        c.dsd_tags.set(DsdTag::LifeLens, true);
        c.dsd_section = Some(DsdSection::Define);

        let patch = suggestion_to_patch(raw(json!({"culturalMoment": true})));
        merge_tags(&mut c, &patch);

        assert!(c.dsd_tags.life_lens);
        assert!(c.dsd_tags.cultural_moment);
        assert_eq!(c.dsd_section, Some(DsdSection::Define));
    }
}
