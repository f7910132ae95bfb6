//! Section assembly: which captures sit under which brief section, in what order.
//!
//! A capture may appear in several sections but at most once per section.
//! "Available" means attached to no section at all.

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::briefs::models::{Brief, BriefSection, SectionKey};
use crate::captures::models::Capture;
use crate::errors::AppError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("section '{section}' is not part of the '{template}' template")]
    UnknownSection {
        section: SectionKey,
        template: &'static str,
    },

    #[error("capture {0} belongs to a different project")]
    ForeignCapture(Uuid),

    #[error("capture {0} appears more than once in the new order")]
    DuplicateInOrder(Uuid),
}

impl From<AssemblyError> for AppError {
    fn from(e: AssemblyError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Returns the section, creating it empty if the stored brief predates it.
fn section_mut(brief: &mut Brief, key: SectionKey) -> Result<&mut BriefSection, AssemblyError> {
    if !brief.template.has_section(key) {
        return Err(AssemblyError::UnknownSection {
            section: key,
            template: brief.template.as_str(),
        });
    }
    Ok(brief
        .sections
        .entry(key)
        .or_insert_with(|| BriefSection::empty(key)))
}

/// Appends the capture to the section unless it is already there.
/// Returns `true` if the list changed.
pub fn attach_capture(
    brief: &mut Brief,
    key: SectionKey,
    capture: &Capture,
) -> Result<bool, AssemblyError> {
    if capture.project_id != brief.project_id {
        return Err(AssemblyError::ForeignCapture(capture.id));
    }
    let section = section_mut(brief, key)?;
    if section.captures.contains(&capture.id) {
        return Ok(false);
    }
    section.captures.push(capture.id);
    Ok(true)
}

/// Removes the capture from this section only. Returns `true` if it was present.
pub fn detach_capture(
    brief: &mut Brief,
    key: SectionKey,
    capture_id: Uuid,
) -> Result<bool, AssemblyError> {
    let section = section_mut(brief, key)?;
    let before = section.captures.len();
    section.captures.retain(|id| *id != capture_id);
    Ok(section.captures.len() != before)
}

/// Replaces the section's commentary. No length limit or markdown validation.
pub fn update_section_content(
    brief: &mut Brief,
    key: SectionKey,
    content: String,
) -> Result<(), AssemblyError> {
    section_mut(brief, key)?.content = content;
    Ok(())
}

/// Saves the whole section list in the given order.
///
/// Every id must belong to the brief's project (`project_captures`) and none may repeat.
pub fn reorder_section(
    brief: &mut Brief,
    key: SectionKey,
    order: Vec<Uuid>,
    project_captures: &HashSet<Uuid>,
) -> Result<(), AssemblyError> {
    let mut seen = HashSet::with_capacity(order.len());
    for id in &order {
        if !project_captures.contains(id) {
            return Err(AssemblyError::ForeignCapture(*id));
        }
        if !seen.insert(*id) {
            return Err(AssemblyError::DuplicateInOrder(*id));
        }
    }
    section_mut(brief, key)?.captures = order;
    Ok(())
}

/// Every capture id attached to any section.
pub fn attached_ids(brief: &Brief) -> HashSet<Uuid> {
    brief
        .sections
        .values()
        .flat_map(|s| s.captures.iter().copied())
        .collect()
}

/// Project captures not attached to any section of the brief, in input order.
pub fn available_captures(project_captures: Vec<Capture>, brief: &Brief) -> Vec<Capture> {
    let attached = attached_ids(brief);
    project_captures
        .into_iter()
        .filter(|c| !attached.contains(&c.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::briefs::models::fixtures::brief;
    use crate::briefs::models::{BriefSections, BriefTemplate};
    use crate::captures::models::fixtures::capture;

    #[test]
    fn test_attach_twice_keeps_one_entry() {
        let mut b = brief(BriefTemplate::Dsd);
        let c = capture("X", "...");

        assert!(attach_capture(&mut b, SectionKey::Define, &c).unwrap());
        assert!(!attach_capture(&mut b, SectionKey::Define, &c).unwrap());

        assert_eq!(b.sections[&SectionKey::Define].captures, vec![c.id]);
    }

    #[test]
    fn test_capture_may_sit_in_several_sections() {
        let mut b = brief(BriefTemplate::Dsd);
        let c = capture("X", "...");
        attach_capture(&mut b, SectionKey::Define, &c).unwrap();
        attach_capture(&mut b, SectionKey::Deliver, &c).unwrap();

        assert_eq!(b.sections[&SectionKey::Define].captures, vec![c.id]);
        assert_eq!(b.sections[&SectionKey::Deliver].captures, vec![c.id]);
    }

    #[test]
    fn test_attached_capture_is_not_available_anywhere() {
        let mut b = brief(BriefTemplate::Dsd);
        let attached = capture("attached", "...");
        let free = capture("free", "...");
        attach_capture(&mut b, SectionKey::Define, &attached).unwrap();

        let available = available_captures(vec![attached.clone(), free.clone()], &b);

        assert!(!b.sections[&SectionKey::Shift].captures.contains(&attached.id));
        assert_eq!(available, vec![free]);
    }

    #[test]
    fn test_new_capture_is_untagged_and_available() {
        let b = brief(BriefTemplate::Dsd);
        let c = capture("X", "...");

        assert_eq!(c.dsd_section, None);
        assert_eq!(available_captures(vec![c.clone()], &b), vec![c]);
    }

    #[test]
    fn test_detach_frees_only_when_no_other_section_holds_it() {
        let mut b = brief(BriefTemplate::Dsd);
        let c = capture("X", "...");
        attach_capture(&mut b, SectionKey::Define, &c).unwrap();
        attach_capture(&mut b, SectionKey::Shift, &c).unwrap();

        assert!(detach_capture(&mut b, SectionKey::Define, c.id).unwrap());
        assert!(available_captures(vec![c.clone()], &b).is_empty());

        assert!(detach_capture(&mut b, SectionKey::Shift, c.id).unwrap());
        assert_eq!(available_captures(vec![c.clone()], &b), vec![c]);
    }

    #[test]
    fn test_detach_missing_id_is_a_no_op() {
        let mut b = brief(BriefTemplate::Dsd);
        assert!(!detach_capture(&mut b, SectionKey::Define, Uuid::new_v4()).unwrap());
    }

    #[test]
    fn test_section_outside_template_is_rejected() {
        let mut b = brief(BriefTemplate::Dsd);
        let c = capture("X", "...");
        let err = attach_capture(&mut b, SectionKey::Ideation, &c).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::UnknownSection {
                section: SectionKey::Ideation,
                template: "dsd"
            }
        );
    }

    #[test]
    fn test_foreign_capture_is_rejected() {
        let mut b = brief(BriefTemplate::Dsd);
        let mut c = capture("X", "...");
        c.project_id = Uuid::new_v4();
        assert_eq!(
            attach_capture(&mut b, SectionKey::Define, &c),
            Err(AssemblyError::ForeignCapture(c.id))
        );
    }

    #[test]
    fn test_update_content_replaces_text() {
        let mut b = brief(BriefTemplate::JimmyJohns);
        update_section_content(&mut b, SectionKey::Ideation, "Lean into **late night**".into())
            .unwrap();
        assert_eq!(
            b.sections[&SectionKey::Ideation].content,
            "Lean into **late night**"
        );
    }

    #[test]
    fn test_reorder_survives_storage_round_trip() {
        let mut b = brief(BriefTemplate::Dsd);
        let (a, bb, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let project: HashSet<Uuid> = [a, bb, c].into_iter().collect();

        reorder_section(&mut b, SectionKey::Define, vec![c, a, bb], &project).unwrap();
        reorder_section(&mut b, SectionKey::Define, vec![a, bb, c], &project).unwrap();

        let stored = serde_json::to_string(&b.sections).unwrap();
        let reloaded: BriefSections = serde_json::from_str(&stored).unwrap();
        assert_eq!(reloaded[&SectionKey::Define].captures, vec![a, bb, c]);
    }

    #[test]
    fn test_reorder_rejects_duplicates_and_strangers() {
        let mut b = brief(BriefTemplate::Dsd);
        let a = Uuid::new_v4();
        let project: HashSet<Uuid> = [a].into_iter().collect();

        assert_eq!(
            reorder_section(&mut b, SectionKey::Define, vec![a, a], &project),
            Err(AssemblyError::DuplicateInOrder(a))
        );
        let stranger = Uuid::new_v4();
        assert_eq!(
            reorder_section(&mut b, SectionKey::Define, vec![stranger], &project),
            Err(AssemblyError::ForeignCapture(stranger))
        );
        assert!(b.sections[&SectionKey::Define].captures.is_empty());
    }
}
