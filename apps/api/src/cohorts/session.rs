//! Session-scoped cohort lists in Redis.
//!
//! One JSON array per session under `cohorts:session:<id>`. Every write resets
//! the expiry, so an idle session's list disappears after the configured TTL.

use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

use crate::cohorts::models::Cohort;
use crate::errors::AppError;

const MAX_SESSION_ID_LEN: usize = 128;

/// Session ids become part of a Redis key, so only a safe alphabet is accepted.
pub fn validate_session_id(id: &str) -> Result<(), AppError> {
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!("invalid session id '{id}'")))
    }
}

pub fn session_key(session_id: &str) -> String {
    format!("cohorts:session:{session_id}")
}

pub fn add_cohort(cohorts: &mut Vec<Cohort>, cohort: Cohort) {
    cohorts.push(cohort);
}

/// Returns `true` if a cohort with that id was removed.
pub fn remove_cohort(cohorts: &mut Vec<Cohort>, id: Uuid) -> bool {
    let before = cohorts.len();
    cohorts.retain(|c| c.id != id);
    cohorts.len() != before
}

#[derive(Clone)]
pub struct CohortSessions {
    client: redis::Client,
    ttl_secs: u64,
}

impl CohortSessions {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    /// An unknown or expired session reads as an empty list.
    pub async fn load(&self, session_id: &str) -> Result<Vec<Cohort>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(session_key(session_id)).await?;
        match raw {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "corrupt cohort list for session {session_id}: {e}"
                ))
            }),
            None => Ok(vec![]),
        }
    }

    pub async fn save(&self, session_id: &str, cohorts: &[Cohort]) -> Result<(), AppError> {
        let json = serde_json::to_string(cohorts).map_err(|e| AppError::Internal(e.into()))?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(session_key(session_id), json, self.ttl_secs)
            .await?;
        debug!(
            "Saved {} cohorts for session {session_id} (ttl {}s)",
            cohorts.len(),
            self.ttl_secs
        );
        Ok(())
    }
}
