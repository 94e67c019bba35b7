//! Job cache rows.
//!
//! One row per cache key holding the serialized job list. Timestamps are
//! stored as RFC 3339 UTC with millisecond precision so that text comparison
//! matches chronological order.

use super::connection::CacheDb;
use crate::Error;
use crate::model::{CacheEntry, JobPosting};
use chrono::{DateTime, SecondsFormat, Utc};
use tokio_rusqlite::{params, rusqlite};

pub(crate) fn to_db_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn from_db_time(text: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Serialization(format!("bad timestamp {text:?}: {e}")))
}

impl CacheDb {
    /// Get the entry for `cache_key` if it was fetched at or after `not_before`.
    pub async fn get_entry(&self, cache_key: &str, not_before: DateTime<Utc>) -> Result<Option<CacheEntry>, Error> {
        let cache_key = cache_key.to_string();
        let cutoff = to_db_time(not_before);
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT cache_key, jobs_json, total_results, fetched_at
                     FROM job_cache WHERE cache_key = ?1 AND fetched_at >= ?2",
                )?;

                let row = stmt.query_row(params![cache_key, cutoff], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                });

                match row {
                    Ok((cache_key, jobs_json, total_results, fetched_at)) => {
                        let jobs: Vec<JobPosting> = serde_json::from_str(&jobs_json)?;
                        Ok(Some(CacheEntry {
                            cache_key,
                            jobs,
                            fetched_at: from_db_time(&fetched_at)?,
                            total_results: total_results.max(0) as u64,
                        }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the entry for its cache key.
    pub async fn put_entry(&self, entry: &CacheEntry) -> Result<(), Error> {
        let jobs_json = serde_json::to_string(&entry.jobs)?;
        let cache_key = entry.cache_key.clone();
        let job_count = entry.jobs.len() as i64;
        let total_results = i64::try_from(entry.total_results).unwrap_or(i64::MAX);
        let fetched_at = to_db_time(entry.fetched_at);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO job_cache (cache_key, jobs_json, job_count, total_results, fetched_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(cache_key) DO UPDATE SET
                        jobs_json = excluded.jobs_json,
                        job_count = excluded.job_count,
                        total_results = excluded.total_results,
                        fetched_at = excluded.fetched_at",
                    params![cache_key, jobs_json, job_count, total_results, fetched_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries fetched before `cutoff`. Returns the number deleted.
    pub async fn purge_entries_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let cutoff = to_db_time(cutoff);
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM job_cache WHERE fetched_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn entry_count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM job_cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
