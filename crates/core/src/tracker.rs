//! Fire-and-forget interaction recording and store housekeeping.

use std::sync::Arc;

use chrono::Duration;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::model::{InteractionEvent, InteractionKind, UserContext};
use crate::store::DualStore;

#[derive(Debug, Clone)]
pub struct InteractionTracker {
    stores: DualStore,
    clock: Arc<dyn Clock>,
}

impl InteractionTracker {
    pub fn new(stores: DualStore, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    /// Write the event to both stores on a background task.
    ///
    /// Callers normally drop the handle; failures are only logged. Must be
    /// called from within a Tokio runtime.
    pub fn record_interaction(
        &self, job_id: &str, kind: InteractionKind, user: &UserContext, metadata: serde_json::Value,
    ) -> JoinHandle<()> {
        let event = InteractionEvent {
            job_id: job_id.to_string(),
            kind,
            user: user.clone(),
            metadata,
            timestamp: self.clock.now(),
        };
        let stores = self.stores.clone();

        tokio::spawn(async move {
            let outcome = stores.record_interaction(&event).await;
            if outcome.any() {
                tracing::debug!(job_id = %event.job_id, kind = event.kind.as_str(), "interaction recorded");
            } else {
                tracing::warn!(job_id = %event.job_id, kind = event.kind.as_str(), "interaction dropped");
            }
        })
    }

    /// Delete persisted entries older than `max_age` from both stores.
    pub async fn cleanup_expired(&self, max_age: Duration) -> u64 {
        let deleted = self.stores.cleanup(max_age, self.clock.now()).await;
        tracing::info!(deleted, max_age_hours = max_age.num_hours(), "expired cache entries removed");
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::{MockStore, sample_entry};
    use chrono::Utc;

    fn tracker(primary: &Arc<MockStore>, secondary: &Arc<MockStore>) -> InteractionTracker {
        InteractionTracker::new(
            DualStore::new(primary.clone(), secondary.clone()),
            Arc::new(ManualClock::new(Utc::now())),
        )
    }

    #[tokio::test]
    async fn test_records_to_both_stores() {
        let primary = Arc::new(MockStore::new("primary"));
        let secondary = Arc::new(MockStore::new("secondary"));

        tracker(&primary, &secondary)
            .record_interaction("42", InteractionKind::Save, &UserContext::new_user(), serde_json::json!({"from": "list"}))
            .await
            .unwrap();

        assert_eq!(primary.interaction_count(), 1);
        assert_eq!(secondary.interaction_count(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_does_not_panic() {
        let primary = Arc::new(MockStore::failing("primary"));
        let secondary = Arc::new(MockStore::new("secondary"));

        let handle = tracker(&primary, &secondary).record_interaction(
            "42",
            InteractionKind::Click,
            &UserContext::returning(None),
            serde_json::Value::Null,
        );

        assert!(handle.await.is_ok());
        assert_eq!(secondary.interaction_count(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_fresh_entries() {
        let primary = Arc::new(MockStore::new("primary"));
        let secondary = Arc::new(MockStore::new("secondary"));
        let mut old = sample_entry("old", 1);
        old.fetched_at = Utc::now() - Duration::days(22);
        primary.insert(old);
        primary.insert(sample_entry("fresh", 1));

        let deleted = tracker(&primary, &secondary).cleanup_expired(Duration::hours(504)).await;

        assert_eq!(deleted, 1);
        assert!(primary.get("fresh").is_some());
    }

    #[tokio::test]
    async fn test_cleanup_cutoff_follows_clock() {
        let primary = Arc::new(MockStore::new("primary"));
        let secondary = Arc::new(MockStore::new("secondary"));
        primary.insert(sample_entry("recent", 1));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let tracker = InteractionTracker::new(DualStore::new(primary.clone(), secondary.clone()), clock.clone());

        assert_eq!(tracker.cleanup_expired(Duration::hours(504)).await, 0);

        clock.advance(Duration::days(22));
        assert_eq!(tracker.cleanup_expired(Duration::hours(504)).await, 1);
        assert!(primary.get("recent").is_none());
    }
}
