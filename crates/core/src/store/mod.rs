//! Persistent stores behind one capability trait.
//!
//! Any store that can answer the four operations below can stand in as
//! primary or secondary; [`DualStore`] composes two of them.

mod dual;

pub use dual::{CacheSource, DualStore, Lookup, PersistOutcome};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::Error;
use crate::cache::CacheDb;
use crate::model::{CacheEntry, InteractionEvent};

#[async_trait]
pub trait JobStore: Send + Sync {
    fn name(&self) -> &str;

    /// Entry for `cache_key` fetched no longer than `ttl` before `now`.
    async fn query_by_key_with_ttl(
        &self, cache_key: &str, ttl: Duration, now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, Error>;

    async fn upsert(&self, entry: &CacheEntry) -> Result<(), Error>;

    async fn record_interaction(&self, event: &InteractionEvent) -> Result<(), Error>;

    /// Remove entries older than `max_age` at `now`. Returns the number removed.
    async fn delete_expired(&self, max_age: Duration, now: DateTime<Utc>) -> Result<u64, Error>;
}

#[async_trait]
impl JobStore for CacheDb {
    fn name(&self) -> &str {
        CacheDb::name(self)
    }

    async fn query_by_key_with_ttl(
        &self, cache_key: &str, ttl: Duration, now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, Error> {
        self.get_entry(cache_key, now - ttl).await
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<(), Error> {
        self.put_entry(entry).await
    }

    async fn record_interaction(&self, event: &InteractionEvent) -> Result<(), Error> {
        self.insert_interaction(event).await
    }

    async fn delete_expired(&self, max_age: Duration, now: DateTime<Utc>) -> Result<u64, Error> {
        self.purge_entries_before(now - max_age).await
    }
}
