//! Capture filtering for the tagging and brief-builder views.
//!
//! Every active predicate must hold (logical AND). Input order is preserved
//! unless a sort is requested explicitly.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

use crate::captures::models::{Capture, DsdSection};

/// A filter selection that is either inactive ("all") or pinned to one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: FromStr<Err = String>> Choice<T> {
    /// Absent, empty and `"all"` (any case) all mean the filter is inactive.
    pub fn parse(raw: Option<&str>) -> Result<Self, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Choice::All),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(Choice::All),
            Some(s) => s.parse().map(Choice::Only),
        }
    }
}

impl Choice<String> {
    /// Free-form selections (platform, tag) with the same "all" convention.
    pub fn text(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Choice::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Choice::All,
            Some(s) => Choice::Only(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSort {
    /// Insertion (created-at) order.
    #[default]
    Created,
    /// Highest viral score first; unscored captures last.
    Viral,
}

#[derive(Debug, Clone, Default)]
pub struct CaptureFilter {
    pub search: String,
    pub platform: Choice<String>,
    pub section: Choice<DsdSection>,
    pub tag: Choice<String>,
}

impl CaptureFilter {
    pub fn matches(&self, capture: &Capture) -> bool {
        self.matches_search(capture)
            && self.matches_platform(capture)
            && self.matches_section(capture)
            && self.matches_tag(capture)
    }

    fn matches_search(&self, capture: &Capture) -> bool {
        let term = self.search.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        capture.title.to_lowercase().contains(&term)
            || capture.content.to_lowercase().contains(&term)
            || capture
                .workspace_notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(&term))
    }

    fn matches_platform(&self, capture: &Capture) -> bool {
        match &self.platform {
            Choice::All => true,
            Choice::Only(p) => capture.platform.eq_ignore_ascii_case(p),
        }
    }

    fn matches_section(&self, capture: &Capture) -> bool {
        match self.section {
            Choice::All => true,
            Choice::Only(section) => capture.dsd_section == Some(section),
        }
    }

    fn matches_tag(&self, capture: &Capture) -> bool {
        match &self.tag {
            Choice::All => true,
            Choice::Only(tag) => capture.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
        }
    }
}

/// Returns the captures satisfying every active predicate, in input order.
/// An empty result is a normal outcome, not an error.
pub fn filter_captures(captures: Vec<Capture>, filter: &CaptureFilter) -> Vec<Capture> {
    captures.into_iter().filter(|c| filter.matches(c)).collect()
}

pub fn sort_captures(captures: &mut [Capture], sort: CaptureSort) {
    match sort {
        CaptureSort::Created => captures.sort_by_key(|c| c.created_at),
        CaptureSort::Viral => captures.sort_by(|a, b| match (a.viral_score, b.viral_score) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
}
