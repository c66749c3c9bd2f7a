use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::types::ProbeOutcome;
use crate::database::ServiceRepository;
use crate::error::RepositoryError;

/// Applies probe outcomes to stored service state and detects transitions.
///
/// Records for the same service are serialized through a per-service async
/// lock, so a scheduled sweep and an on-demand check can never interleave
/// their read-then-write: no stale status clobbers a fresher one and no
/// transition is counted twice. Checks on different services stay fully
/// concurrent.
pub struct StatusTracker {
    repository: Arc<dyn ServiceRepository>,
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl StatusTracker {
    pub fn new(repository: Arc<dyn ServiceRepository>) -> Self {
        Self { repository, locks: Mutex::new(HashMap::new()) }
    }

    async fn lock_for(&self, service_id: i64) -> Arc<Mutex<()>> {
        self.locks.lock().await.entry(service_id).or_default().clone()
    }

    /// Persist an outcome and report whether the up/down classification
    /// changed. The first check on a service only establishes the baseline
    /// and never counts as a transition. The status write happens even when
    /// nothing changed, so `last_checked` always advances. A transition is
    /// only reported when the write actually landed: an outcome older than
    /// the persisted `last_checked` is discarded by the repository and never
    /// announced.
    pub async fn record(
        &self,
        service_id: i64,
        outcome: ProbeOutcome,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let lock = self.lock_for(service_id).await;
        let _guard = lock.lock().await;

        let Some(service) = self.repository.get_service(service_id).await? else {
            // Deleted while the probe was in flight; drop its lock entry
            // too, or the map grows with every deleted service.
            self.locks.lock().await.remove(&service_id);
            return Ok(false);
        };

        let previous = service.last_status;
        let written = self.repository.update_status(service_id, outcome.is_up, now).await?;
        if !written {
            // A fresher check already recorded past `now`, so this result
            // is stale: nothing persisted, nothing to announce.
            return Ok(false);
        }

        Ok(previous.is_known() && previous != outcome.status())
    }

    #[cfg(test)]
    pub(crate) async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }
}
