//! In-memory doubles for stores and the job API.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::Error;
use crate::model::{CacheEntry, InteractionEvent, JobPosting, SalaryRange, SearchQuery};
use crate::source::{JobSource, RawJobPage, SourceError};
use crate::store::JobStore;

pub(crate) fn sample_job(id: &str) -> JobPosting {
    JobPosting {
        id: id.to_string(),
        title: format!("Job {id}"),
        company: "Acme".to_string(),
        location: "London".to_string(),
        salary: SalaryRange { min: None, max: None, display: "Salary not specified".to_string() },
        description_snippet: String::new(),
        url: None,
        posted_date: None,
        posted_label: "recently".to_string(),
        source: "test".to_string(),
        contract_type: None,
        category: None,
    }
}

pub(crate) fn sample_entry(key: &str, jobs: usize) -> CacheEntry {
    CacheEntry {
        cache_key: key.to_string(),
        jobs: (0..jobs).map(|i| sample_job(&format!("{key}-{i}"))).collect(),
        fetched_at: Utc::now(),
        total_results: jobs as u64,
    }
}

/// HashMap-backed store that can be switched to fail every call.
pub(crate) struct MockStore {
    name: String,
    fail: bool,
    entries: Mutex<HashMap<String, CacheEntry>>,
    interactions: Mutex<Vec<InteractionEvent>>,
    queries: AtomicUsize,
}

impl MockStore {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            entries: Mutex::new(HashMap::new()),
            interactions: Mutex::new(Vec::new()),
            queries: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(name: &str) -> Self {
        Self { fail: true, ..Self::new(name) }
    }

    pub(crate) fn insert(&self, entry: CacheEntry) {
        self.entries.lock().unwrap().insert(entry.cache_key.clone(), entry);
    }

    pub(crate) fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn interaction_count(&self) -> usize {
        self.interactions.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), Error> {
        if self.fail { Err(Error::StoreUnavailable(format!("{} is down", self.name))) } else { Ok(()) }
    }
}

#[async_trait]
impl JobStore for MockStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query_by_key_with_ttl(
        &self, cache_key: &str, ttl: Duration, now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, Error> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let cutoff = now - ttl;
        Ok(self.get(cache_key).filter(|e| e.fetched_at >= cutoff))
    }

    async fn upsert(&self, entry: &CacheEntry) -> Result<(), Error> {
        self.check()?;
        self.insert(entry.clone());
        Ok(())
    }

    async fn record_interaction(&self, event: &InteractionEvent) -> Result<(), Error> {
        self.check()?;
        self.interactions.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn delete_expired(&self, max_age: Duration, now: DateTime<Utc>) -> Result<u64, Error> {
        self.check()?;
        let cutoff = now - max_age;
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, e| e.fetched_at >= cutoff);
        Ok((before - entries.len()) as u64)
    }
}

/// Job API double serving generated records until `total` is reached.
pub(crate) struct MockSource {
    total: u64,
    failing_pages: HashSet<u32>,
    calls: Mutex<Vec<u32>>,
}

impl MockSource {
    pub(crate) fn new(total: u64) -> Self {
        Self { total, failing_pages: HashSet::new(), calls: Mutex::new(Vec::new()) }
    }

    pub(crate) fn failing_on(mut self, pages: &[u32]) -> Self {
        self.failing_pages.extend(pages);
        self
    }

    pub(crate) fn calls(&self) -> Vec<u32> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_page(&self, query: &SearchQuery, page: u32, per_page: u32) -> Result<RawJobPage, SourceError> {
        self.calls.lock().unwrap().push(page);
        if self.failing_pages.contains(&page) {
            return Err(SourceError::Http { status: 503 });
        }
        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        let available = self.total.saturating_sub(offset).min(u64::from(per_page));
        let records = (0..available)
            .map(|i| {
                serde_json::json!({
                    "id": format!("p{page}-{i}"),
                    "title": format!("{} #{i}", query.raw_keywords),
                    "company": {"display_name": "Acme"},
                    "location": {"display_name": query.raw_location},
                    "salary_min": 40000,
                    "created": Utc::now().to_rfc3339(),
                })
            })
            .collect();
        Ok(RawJobPage { count: self.total, records })
    }
}
