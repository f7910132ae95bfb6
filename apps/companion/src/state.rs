//! Companion local state: the outbox of recent captures plus session bookkeeping.
//!
//! Everything here is pure so the outbox rules can be tested without a backend
//! or a filesystem.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Newest-first ring buffer capacity.
pub const RING_CAPACITY: usize = 50;

pub fn session_lifetime() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Exact selection only.
    #[default]
    Precision,
    /// Selection plus surrounding page context.
    Context,
}

/// Body of `POST /api/captures`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePayload {
    pub user_id: Uuid,
    pub project_id: Uuid,
    #[serde(rename = "type")]
    pub capture_type: String,
    pub platform: String,
    pub title: String,
    pub content: String,
    pub source_url: Option<String>,
    pub screenshot_ref: Option<String>,
    pub user_note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCapture {
    pub local_id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub synced: bool,
    pub payload: CapturePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceNote {
    pub id: Uuid,
    pub transcript: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionState {
    pub is_authenticated: bool,
    pub current_project: Option<Uuid>,
    pub recent_captures: Vec<LocalCapture>,
    pub voice_notes: Vec<VoiceNote>,
    pub capture_mode: CaptureMode,
    pub session_started: DateTime<Utc>,
}

/// Summary shown by `radar-companion status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionStatus {
    pub is_authenticated: bool,
    pub current_project: Option<Uuid>,
    pub capture_count: usize,
    pub unsynced_count: usize,
    pub capture_mode: CaptureMode,
    pub voice_note_count: usize,
    pub session_age_secs: i64,
}

impl CompanionState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            is_authenticated: false,
            current_project: None,
            recent_captures: vec![],
            voice_notes: vec![],
            capture_mode: CaptureMode::default(),
            session_started: now,
        }
    }

    /// Pushes to the front and drops the oldest entries past capacity.
    pub fn record_capture(&mut self, payload: CapturePayload, synced: bool, now: DateTime<Utc>) {
        self.recent_captures.insert(
            0,
            LocalCapture {
                local_id: Uuid::new_v4(),
                captured_at: now,
                synced,
                payload,
            },
        );
        self.recent_captures.truncate(RING_CAPACITY);
    }

    pub fn record_voice_note(&mut self, transcript: String, now: DateTime<Utc>) {
        self.voice_notes.push(VoiceNote {
            id: Uuid::new_v4(),
            transcript,
            recorded_at: now,
        });
    }

    pub fn unsynced_count(&self) -> usize {
        self.recent_captures.iter().filter(|c| !c.synced).count()
    }

    /// Once the session is older than 24h, clears captures and voice notes and
    /// restarts the clock. Returns `true` if anything was purged.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.session_started <= session_lifetime() {
            return false;
        }
        self.recent_captures.clear();
        self.voice_notes.clear();
        self.session_started = now;
        true
    }

    pub fn status(&self, now: DateTime<Utc>) -> CompanionStatus {
        CompanionStatus {
            is_authenticated: self.is_authenticated,
            current_project: self.current_project,
            capture_count: self.recent_captures.len(),
            unsynced_count: self.unsynced_count(),
            capture_mode: self.capture_mode,
            voice_note_count: self.voice_notes.len(),
            session_age_secs: (now - self.session_started).num_seconds(),
        }
    }
}

/// Maps a page URL to the platform label the dashboard filters on.
pub fn detect_platform(url: &str) -> &'static str {
    let host = reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .unwrap_or_default();
    let on = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));

    if on("instagram.com") {
        "instagram"
    } else if on("youtube.com") {
        "youtube"
    } else if on("tiktok.com") {
        "tiktok"
    } else if on("linkedin.com") {
        "linkedin"
    } else if on("twitter.com") || on("x.com") {
        "twitter"
    } else if on("reddit.com") {
        "reddit"
    } else {
        "web"
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn payload(title: &str) -> CapturePayload {
        CapturePayload {
            user_id: Uuid::nil(),
            project_id: Uuid::nil(),
            capture_type: "text".to_string(),
            platform: "web".to_string(),
            title: title.to_string(),
            content: "...".to_string(),
            source_url: None,
            screenshot_ref: None,
            user_note: None,
            tags: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::payload;
    use super::*;

    #[test]
    fn test_ring_buffer_keeps_newest_fifty() {
        let now = Utc::now();
        let mut state = CompanionState::new(now);
        for i in 0..60 {
            state.record_capture(payload(&format!("c{i}")), true, now);
        }

        assert_eq!(state.recent_captures.len(), RING_CAPACITY);
        assert_eq!(state.recent_captures[0].payload.title, "c59");
        assert_eq!(state.recent_captures[49].payload.title, "c10");
    }

    #[test]
    fn test_purge_only_after_a_day() {
        let start = Utc::now();
        let mut state = CompanionState::new(start);
        state.record_capture(payload("a"), false, start);
        state.record_voice_note("remember this".to_string(), start);

        assert!(!state.purge_expired(start + Duration::hours(24)));
        assert_eq!(state.recent_captures.len(), 1);

        let later = start + Duration::hours(24) + Duration::seconds(1);
        assert!(state.purge_expired(later));
        assert!(state.recent_captures.is_empty());
        assert!(state.voice_notes.is_empty());
        assert_eq!(state.session_started, later);
    }

    #[test]
    fn test_status_counts_unsynced() {
        let now = Utc::now();
        let mut state = CompanionState::new(now - Duration::minutes(5));
        state.record_capture(payload("a"), true, now);
        state.record_capture(payload("b"), false, now);

        let status = state.status(now);
        assert_eq!(status.capture_count, 2);
        assert_eq!(status.unsynced_count, 1);
        assert_eq!(status.session_age_secs, 300);
    }

    #[test]
    fn test_detect_platform() {
        assert_eq!(detect_platform("https://www.tiktok.com/@a/video/1"), "tiktok");
        assert_eq!(detect_platform("https://x.com/someone"), "twitter");
        assert_eq!(detect_platform("https://old.reddit.com/r/food"), "reddit");
        assert_eq!(detect_platform("https://notx.com/"), "web");
        assert_eq!(detect_platform("not a url"), "web");
    }

    #[test]
    fn test_payload_matches_capture_api_fields() {
        let json = serde_json::to_value(payload("a")).unwrap();
        assert_eq!(json["type"], "text");
        assert!(json.get("projectId").is_some());
        assert!(json.get("sourceUrl").is_some());
    }
}
