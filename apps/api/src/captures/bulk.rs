//! Bulk tagging: one patch applied to many captures.
//!
//! Each capture is loaded, patched and saved independently and in order.
//! There is no transaction: a failure on one id leaves earlier updates applied
//! and later ids are still attempted.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::captures::store::CaptureStore;
use crate::captures::tagging::{apply_patch, TaggingPatch};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub updated: Vec<Uuid>,
    pub failed: Vec<Uuid>,
}

impl BulkOutcome {
    pub fn updated_count(&self) -> usize {
        self.updated.len()
    }
}

/// Applies `patch` to every id in `capture_ids` that belongs to one of
/// `owned_projects`. Missing, foreign and failing ids are reported in `failed`.
/// Duplicate ids are processed once.
pub async fn bulk_update(
    store: &dyn CaptureStore,
    capture_ids: &[Uuid],
    patch: &TaggingPatch,
    owned_projects: &HashSet<Uuid>,
) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();
    let mut seen = HashSet::new();

    for &id in capture_ids {
        if !seen.insert(id) {
            continue;
        }

        let mut capture = match store.find(id).await {
            Ok(Some(c)) if owned_projects.contains(&c.project_id) => c,
            Ok(Some(_)) => {
                warn!("Bulk update skipped capture {id}: not owned by caller");
                outcome.failed.push(id);
                continue;
            }
            Ok(None) => {
                warn!("Bulk update skipped capture {id}: not found");
                outcome.failed.push(id);
                continue;
            }
            Err(e) => {
                warn!("Bulk update failed to load capture {id}: {e}");
                outcome.failed.push(id);
                continue;
            }
        };

        apply_patch(&mut capture, patch);

        match store.save_tagging(&capture).await {
            Ok(()) => outcome.updated.push(id),
            Err(e) => {
                warn!("Bulk update failed to save capture {id}: {e}");
                outcome.failed.push(id);
            }
        }
    }

    info!(
        "Bulk update applied to {}/{} captures",
        outcome.updated_count(),
        seen.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captures::models::fixtures::capture;
    use crate::captures::models::{DsdSection, DsdTag};
    use crate::captures::store::testing::MemoryCaptureStore;

    fn deliver_patch() -> TaggingPatch {
        TaggingPatch {
            dsd_tags: None,
            dsd_section: Some(Some(DsdSection::Deliver)),
        }
    }

    fn owned() -> HashSet<Uuid> {
        [Uuid::nil()].into_iter().collect()
    }

    #[tokio::test]
    async fn test_failure_on_one_capture_keeps_the_others() {
        let c1 = capture("First", "...");
        let c2 = capture("Second", "...");
        let (id1, id2) = (c1.id, c2.id);
        let mut store = MemoryCaptureStore::with(vec![c1, c2]);
        store.failing.insert(id2);

        let outcome = bulk_update(&store, &[id1, id2], &deliver_patch(), &owned()).await;

        assert_eq!(outcome.updated, vec![id1]);
        assert_eq!(outcome.failed, vec![id2]);
        assert_eq!(store.get(id1).dsd_section, Some(DsdSection::Deliver));
        assert_eq!(store.get(id2).dsd_section, None);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_ids() {
        let c1 = capture("First", "...");
        let c2 = capture("Second", "...");
        let (id1, id2) = (c1.id, c2.id);
        let mut store = MemoryCaptureStore::with(vec![c1, c2]);
        store.failing.insert(id1);

        let outcome = bulk_update(&store, &[id1, id2], &deliver_patch(), &owned()).await;

        assert_eq!(outcome.updated, vec![id2]);
        assert_eq!(store.get(id2).dsd_section, Some(DsdSection::Deliver));
    }

    #[tokio::test]
    async fn test_unknown_and_foreign_ids_fail() {
        let mut foreign = capture("Foreign", "...");
        foreign.project_id = Uuid::new_v4();
        let foreign_id = foreign.id;
        let missing = Uuid::new_v4();
        let store = MemoryCaptureStore::with(vec![foreign]);

        let outcome = bulk_update(&store, &[foreign_id, missing], &deliver_patch(), &owned()).await;

        assert!(outcome.updated.is_empty());
        assert_eq!(outcome.failed, vec![foreign_id, missing]);
        assert_eq!(store.get(foreign_id).dsd_section, None);
    }

    #[tokio::test]
    async fn test_tag_merge_is_applied_to_each() {
        let c1 = capture("First", "...");
        let mut c2 = capture("Second", "...");
        c2.dsd_section = Some(DsdSection::Define);
        let (id1, id2) = (c1.id, c2.id);
        let store = MemoryCaptureStore::with(vec![c1, c2]);
        let patch = TaggingPatch {
            dsd_tags: Some([(DsdTag::CulturalMoment, true)].into_iter().collect()),
            dsd_section: None,
        };

        let outcome = bulk_update(&store, &[id1, id2, id1], &patch, &owned()).await;

        assert_eq!(outcome.updated_count(), 2);
        assert!(store.get(id1).dsd_tags.cultural_moment);
        assert_eq!(store.get(id1).dsd_section, Some(DsdSection::Shift));
        assert_eq!(store.get(id2).dsd_section, Some(DsdSection::Define));
    }
}
