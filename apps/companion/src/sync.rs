//! Submitting captures to the backend, with the local outbox as fallback.
//!
//! Nothing is retried automatically. Unsynced captures wait for an explicit
//! sync sweep, which attempts each one independently.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::{CapturePayload, CompanionState};
use crate::store::{StateFile, StoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("backend unreachable: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend rejected capture ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Where captures are delivered. The HTTP implementation posts to the API.
#[async_trait]
pub trait CaptureSink: Send + Sync {
    async fn submit(&self, payload: &CapturePayload) -> Result<(), SyncError>;
}

pub struct HttpCaptureSink {
    client: Client,
    captures_url: String,
}

impl HttpCaptureSink {
    pub fn new(api_base: &str) -> Result<Self, SyncError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            captures_url: format!("{}/captures", api_base.trim_end_matches('/')),
        })
    }

    /// Used by `status` to report connectivity.
    pub async fn backend_reachable(&self, health_url: &str) -> bool {
        matches!(
            self.client.get(health_url).send().await,
            Ok(r) if r.status().is_success()
        )
    }
}

#[async_trait]
impl CaptureSink for HttpCaptureSink {
    async fn submit(&self, payload: &CapturePayload) -> Result<(), SyncError> {
        let response = self.client.post(&self.captures_url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Tries the backend first; the capture is recorded locally either way, flagged
/// with whether it reached the backend. Returns that flag.
pub async fn submit_or_queue(
    state: &mut CompanionState,
    sink: &dyn CaptureSink,
    payload: CapturePayload,
) -> bool {
    let synced = match sink.submit(&payload).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Backend unavailable, keeping capture locally: {e}");
            false
        }
    };
    state.record_capture(payload, synced, Utc::now());
    synced
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub attempted: usize,
    pub synced: usize,
}

/// Resubmits every unsynced capture once, flipping `synced` on success.
pub async fn sync_captures_with_backend(
    state: &mut CompanionState,
    sink: &dyn CaptureSink,
) -> SyncReport {
    let mut report = SyncReport::default();

    for capture in state.recent_captures.iter_mut().filter(|c| !c.synced) {
        report.attempted += 1;
        match sink.submit(&capture.payload).await {
            Ok(()) => {
                capture.synced = true;
                report.synced += 1;
            }
            Err(e) => warn!("Sync failed for capture {}: {e}", capture.local_id),
        }
    }

    info!("Synced {} of {} captures", report.synced, report.attempted);
    report
}

/// One janitor pass over the state file: purge an expired session.
pub async fn purge_once(file: &StateFile) -> Result<bool, StoreError> {
    let mut state = file.load().await?;
    let purged = state.purge_expired(Utc::now());
    if purged {
        file.save(&state).await?;
        info!("Session expired; cleared recent captures and voice notes");
    }
    Ok(purged)
}

/// Runs the janitor and, when a sink is given, a sync sweep on fixed intervals
/// until the task is dropped or aborted.
pub async fn run_background(
    file: StateFile,
    sink: Option<Box<dyn CaptureSink>>,
    purge_every: Duration,
    sync_every: Duration,
) {
    let mut purge_tick = tokio::time::interval(purge_every);
    let mut sync_tick = tokio::time::interval(sync_every);

    loop {
        tokio::select! {
            _ = purge_tick.tick() => {
                if let Err(e) = purge_once(&file).await {
                    warn!("Janitor pass failed: {e}");
                }
            }
            _ = sync_tick.tick() => {
                if let Some(sink) = sink.as_deref() {
                    if let Err(e) = sync_file(&file, sink).await {
                        warn!("Background sync failed: {e}");
                    }
                }
            }
        }
    }
}

/// Load, sweep and save in one step.
pub async fn sync_file(file: &StateFile, sink: &dyn CaptureSink) -> Result<SyncReport, StoreError> {
    let mut state = file.load().await?;
    if state.unsynced_count() == 0 {
        return Ok(SyncReport::default());
    }
    let report = sync_captures_with_backend(&mut state, sink).await;
    file.save(&state).await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::payload;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Accepts everything except titles in `reject`. Records accepted titles.
    #[derive(Default)]
    struct FakeSink {
        reject: HashSet<String>,
        accepted: Mutex<Vec<String>>,
    }

    impl FakeSink {
        fn rejecting(titles: &[&str]) -> Self {
            Self {
                reject: titles.iter().map(|t| t.to_string()).collect(),
                accepted: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl CaptureSink for FakeSink {
        async fn submit(&self, payload: &CapturePayload) -> Result<(), SyncError> {
            if self.reject.contains(&payload.title) {
                return Err(SyncError::Rejected {
                    status: 503,
                    body: "down".to_string(),
                });
            }
            self.accepted.lock().unwrap().push(payload.title.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_submit_or_queue_flags_failures() {
        let mut state = CompanionState::new(Utc::now());
        let sink = FakeSink::rejecting(&["offline"]);

        assert!(submit_or_queue(&mut state, &sink, payload("online")).await);
        assert!(!submit_or_queue(&mut state, &sink, payload("offline")).await);

        assert_eq!(state.recent_captures.len(), 2);
        assert!(!state.recent_captures[0].synced);
        assert!(state.recent_captures[1].synced);
    }

    #[tokio::test]
    async fn test_sync_attempts_each_unsynced_capture_independently() {
        let mut state = CompanionState::new(Utc::now());
        let now = Utc::now();
        state.record_capture(payload("done"), true, now);
        state.record_capture(payload("a"), false, now);
        state.record_capture(payload("still-down"), false, now);
        state.record_capture(payload("b"), false, now);

        let sink = FakeSink::rejecting(&["still-down"]);
        let report = sync_captures_with_backend(&mut state, &sink).await;

        assert_eq!(report, SyncReport { attempted: 3, synced: 2 });
        assert_eq!(state.unsynced_count(), 1);
        assert!(!sink.accepted.lock().unwrap().contains(&"done".to_string()));
    }

    #[tokio::test]
    async fn test_sync_file_persists_flags() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        let mut state = CompanionState::new(Utc::now());
        state.record_capture(payload("queued"), false, Utc::now());
        file.save(&state).await.unwrap();

        let report = sync_file(&file, &FakeSink::default()).await.unwrap();

        assert_eq!(report.synced, 1);
        assert_eq!(file.load().await.unwrap().unsynced_count(), 0);
    }

    #[tokio::test]
    async fn test_purge_once_clears_stale_session() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        let mut state = CompanionState::new(Utc::now() - chrono::Duration::hours(25));
        state.record_capture(payload("old"), true, Utc::now());
        file.save(&state).await.unwrap();

        assert!(purge_once(&file).await.unwrap());
        assert!(file.load().await.unwrap().recent_captures.is_empty());
        assert!(!purge_once(&file).await.unwrap());
    }
}
