//! DSD tagging rules, kept free of I/O so they can be tested without a database.
//!
//! Tag heuristic: turning a tag on for a capture with no section assigns the
//! tag's section. An existing section is never overridden by the heuristic.
//! Explicit section assignment always wins.

use serde::Deserialize;

use crate::captures::models::{Capture, DsdSection, DsdTag, DsdTagPatch};
use crate::models::double_option;

/// Sets one tag flag. Returns the section if the heuristic assigned one.
pub fn set_tag(capture: &mut Capture, tag: DsdTag, value: bool) -> Option<DsdSection> {
    capture.dsd_tags.set(tag, value);
    if value && capture.dsd_section.is_none() {
        let section = tag.section();
        capture.dsd_section = Some(section);
        return Some(section);
    }
    None
}

pub fn assign_section(capture: &mut Capture, section: DsdSection) {
    capture.dsd_section = Some(section);
}

/// Merges a partial tag map into the capture's flags. Keys absent from the
/// patch keep their current value. Applied in vocabulary order, so when no
/// section is set the first enabled tag's section is the one assigned.
pub fn merge_tags(capture: &mut Capture, patch: &DsdTagPatch) {
    for (&tag, &value) in patch {
        set_tag(capture, tag, value);
    }
}

/// The tagging portion of a capture update: a tag merge and/or a section overwrite.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggingPatch {
    #[serde(default)]
    pub dsd_tags: Option<DsdTagPatch>,
    /// `Some(None)` clears the section; `None` leaves it alone.
    #[serde(default, deserialize_with = "double_option")]
    pub dsd_section: Option<Option<DsdSection>>,
}

impl TaggingPatch {
    pub fn is_empty(&self) -> bool {
        self.dsd_tags.as_ref().map_or(true, |t| t.is_empty()) && self.dsd_section.is_none()
    }
}

/// Tags merge first, then an explicit section overwrites whatever the heuristic chose.
pub fn apply_patch(capture: &mut Capture, patch: &TaggingPatch) {
    if let Some(tags) = &patch.dsd_tags {
        merge_tags(capture, tags);
    }
    if let Some(section) = patch.dsd_section {
        capture.dsd_section = section;
    }
}

/// Soft invariant: an assigned section should have at least one of its tags on.
/// Reported, never enforced.
pub fn section_is_consistent(capture: &Capture) -> bool {
    capture
        .dsd_section
        .map_or(true, |section| capture.dsd_tags.any_in(section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures::models::fixtures::capture;

    #[test]
    fn test_first_tag_assigns_its_section() {
        let mut c = capture("X", "...");
        let assigned = set_tag(&mut c, DsdTag::HumanTruth, true);
        assert_eq!(assigned, Some(DsdSection::Shift));
        assert_eq!(c.dsd_section, Some(DsdSection::Shift));
        assert!(c.dsd_tags.human_truth);
    }

    #[test]
    fn test_later_tag_from_other_section_does_not_move_section() {
        let mut c = capture("X", "...");
        set_tag(&mut c, DsdTag::HumanTruth, true);
        let assigned = set_tag(&mut c, DsdTag::ExecutionIdea, true);
        assert_eq!(assigned, None);
        assert_eq!(c.dsd_section, Some(DsdSection::Shift));
        assert!(c.dsd_tags.execution_idea);
    }

    #[test]
    fn test_clearing_a_tag_never_assigns() {
        let mut c = capture("X", "...");
        assert_eq!(set_tag(&mut c, DsdTag::LifeLens, false), None);
        assert_eq!(c.dsd_section, None);
    }

    #[test]
    fn test_assign_section_overrides_regardless_of_tags() {
        let mut c = capture("X", "...");
        set_tag(&mut c, DsdTag::RawBehavior, true);
        assign_section(&mut c, DsdSection::Deliver);
        assert_eq!(c.dsd_section, Some(DsdSection::Deliver));
        assert!(c.dsd_tags.raw_behavior);
    }

    #[test]
    fn test_merge_keeps_unmentioned_tags() {
        let mut c = capture("X", "...");
        c.dsd_tags.channel_vibes = true;
        let patch: DsdTagPatch = [(DsdTag::CulturalMoment, true)].into_iter().collect();
        merge_tags(&mut c, &patch);
        assert!(c.dsd_tags.channel_vibes);
        assert!(c.dsd_tags.cultural_moment);
    }

    #[test]
    fn test_merge_uses_vocabulary_order_for_heuristic() {
        let mut c = capture("X", "...");
        let patch: DsdTagPatch = [(DsdTag::AttentionValue, true), (DsdTag::LifeLens, true)]
            .into_iter()
            .collect();
        merge_tags(&mut c, &patch);
        assert_eq!(c.dsd_section, Some(DsdSection::Define));
    }

    #[test]
    fn test_patch_section_beats_heuristic() {
        let mut c = capture("X", "...");
        let patch: TaggingPatch = serde_json::from_str(
            r#"{"dsdTags": {"lifeLens": true}, "dsdSection": "deliver"}"#,
        )
        .unwrap();
        apply_patch(&mut c, &patch);
        assert_eq!(c.dsd_section, Some(DsdSection::Deliver));
        assert!(c.dsd_tags.life_lens);
    }

    #[test]
    fn test_patch_null_section_clears() {
        let mut c = capture("X", "...");
        c.dsd_section = Some(DsdSection::Shift);
        let patch: TaggingPatch = serde_json::from_str(r#"{"dsdSection": null}"#).unwrap();
        assert!(!patch.is_empty());
        apply_patch(&mut c, &patch);
        assert_eq!(c.dsd_section, None);
    }

    #[test]
    fn test_patch_without_section_leaves_it() {
        let mut c = capture("X", "...");
        c.dsd_section = Some(DsdSection::Shift);
        let patch: TaggingPatch = serde_json::from_str(r#"{}"#).unwrap();
        assert!(patch.is_empty());
        apply_patch(&mut c, &patch);
        assert_eq!(c.dsd_section, Some(DsdSection::Shift));
    }

    #[test]
    fn test_new_capture_has_no_section_and_is_consistent() {
        let c = capture("X", "...");
        assert_eq!(c.dsd_section, None);
        assert!(section_is_consistent(&c));
    }

    #[test]
    fn test_explicit_section_without_tags_is_inconsistent() {
        let mut c = capture("X", "...");
        assign_section(&mut c, DsdSection::Define);
        assert!(!section_is_consistent(&c));
    }
}
