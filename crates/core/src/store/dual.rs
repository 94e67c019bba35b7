//! Primary/secondary store coordination.
//!
//! Reads try the primary and fall back to the secondary. Writes go to both
//! independently: a failure on one side is logged and never undoes or blocks
//! the other, so the two stores may drift apart.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::JobStore;
use crate::model::{CacheEntry, InteractionEvent};

/// Which store answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheSource {
    #[serde(rename = "primary")]
    Primary,
    /// Primary unreachable; secondary answered.
    #[serde(rename = "secondary")]
    Secondary,
    /// Primary reachable but empty; secondary answered.
    #[serde(rename = "primary+secondary")]
    PrimaryAndSecondary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Hit { entry: CacheEntry, source: CacheSource },
    Miss,
}

/// Which writes of a dual persist succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    pub primary: bool,
    pub secondary: bool,
}

impl PersistOutcome {
    pub fn any(&self) -> bool {
        self.primary || self.secondary
    }
}

enum Probe {
    Populated(CacheEntry),
    Empty,
    Unreachable,
}

async fn probe(store: &dyn JobStore, cache_key: &str, ttl: Duration, now: DateTime<Utc>) -> Probe {
    match store.query_by_key_with_ttl(cache_key, ttl, now).await {
        Ok(Some(entry)) if !entry.jobs.is_empty() => Probe::Populated(entry),
        Ok(_) => Probe::Empty,
        Err(e) => {
            tracing::warn!(store = store.name(), cache_key, error = %e, "store lookup failed");
            Probe::Unreachable
        }
    }
}

fn log_write(store: &dyn JobStore, what: &str, result: Result<(), crate::Error>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "store {what} failed");
            false
        }
    }
}

/// Two interchangeable stores composed as primary-then-secondary.
#[derive(Clone)]
pub struct DualStore {
    primary: Arc<dyn JobStore>,
    secondary: Arc<dyn JobStore>,
}

impl std::fmt::Debug for DualStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualStore")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .finish()
    }
}

impl DualStore {
    pub fn new(primary: Arc<dyn JobStore>, secondary: Arc<dyn JobStore>) -> Self {
        Self { primary, secondary }
    }

    /// Find a populated entry no older than `ttl` at `now`. Never fails.
    pub async fn lookup(&self, cache_key: &str, ttl: Duration, now: DateTime<Utc>) -> Lookup {
        let primary_reachable = match probe(self.primary.as_ref(), cache_key, ttl, now).await {
            Probe::Populated(entry) => return Lookup::Hit { entry, source: CacheSource::Primary },
            Probe::Empty => true,
            Probe::Unreachable => false,
        };

        match probe(self.secondary.as_ref(), cache_key, ttl, now).await {
            Probe::Populated(entry) => {
                let source = if primary_reachable { CacheSource::PrimaryAndSecondary } else { CacheSource::Secondary };
                Lookup::Hit { entry, source }
            }
            Probe::Empty | Probe::Unreachable => Lookup::Miss,
        }
    }

    /// Write the entry to both stores concurrently.
    pub async fn persist(&self, entry: &CacheEntry) -> PersistOutcome {
        let (primary, secondary) = tokio::join!(self.primary.upsert(entry), self.secondary.upsert(entry));
        let outcome = PersistOutcome {
            primary: log_write(self.primary.as_ref(), "upsert", primary),
            secondary: log_write(self.secondary.as_ref(), "upsert", secondary),
        };
        if !outcome.any() {
            tracing::error!(cache_key = %entry.cache_key, "entry not persisted to any store");
        }
        outcome
    }

    pub async fn record_interaction(&self, event: &InteractionEvent) -> PersistOutcome {
        let (primary, secondary) =
            tokio::join!(self.primary.record_interaction(event), self.secondary.record_interaction(event));
        PersistOutcome {
            primary: log_write(self.primary.as_ref(), "interaction insert", primary),
            secondary: log_write(self.secondary.as_ref(), "interaction insert", secondary),
        }
    }

    /// Delete old entries from both stores. Returns the combined count.
    pub async fn cleanup(&self, max_age: Duration, now: DateTime<Utc>) -> u64 {
        let (primary, secondary) =
            tokio::join!(self.primary.delete_expired(max_age, now), self.secondary.delete_expired(max_age, now));

        [(self.primary.as_ref(), primary), (self.secondary.as_ref(), secondary)]
            .into_iter()
            .map(|(store, result)| match result {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(store = store.name(), error = %e, "store cleanup failed");
                    0
                }
            })
            .sum()
    }
}
