//! Fetch orchestrator.
//!
//! [`JobSearchService::search`] walks the cache tiers before spending budget:
//!
//! 1. quick cache (identical request in the last few minutes)
//! 2. persistent stores at the policy TTL, unless a high-priority peak request
//!    finds the entry old enough to refresh
//! 3. persistent stores at the extended TTL once the daily budget is spent
//! 4. the external API: several pages for a new search, one page otherwise
//!
//! Store failures and single-page failures inside a multi-page fetch are
//! absorbed here; only budget exhaustion and a failed single-page fetch are
//! returned as errors.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::budget::{BudgetTracker, UsageStats};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::model::{CacheEntry, InteractionKind, JobPosting, SearchParams, SearchQuery, UserContext};
use crate::parse::{ParseContext, parse_records};
use crate::policy::CachePolicy;
use crate::quick::QuickCache;
use crate::source::JobSource;
use crate::store::{CacheSource, DualStore, Lookup};
use crate::tracker::InteractionTracker;

/// How a response was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Quick cache.
    Instant,
    /// Persistent store within the policy TTL.
    Cached,
    /// Persistent store at the extended TTL because the budget is spent.
    Extended,
    /// Fetched from the external API.
    Live,
}

impl CacheStatus {
    pub fn is_cached(&self) -> bool {
        !matches!(self, CacheStatus::Live)
    }
}

/// Outcome of a multi-page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSummary {
    pub total_fetched: usize,
    pub pages_processed: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub jobs: Vec<JobPosting>,
    pub count: usize,
    pub total_results: u64,
    pub has_more: bool,
    pub page: u32,
    pub cached: bool,
    #[serde(rename = "cacheStatus")]
    pub cache_status: CacheStatus,
    #[serde(rename = "cacheSource", default, skip_serializing_if = "Option::is_none")]
    pub cache_source: Option<CacheSource>,
    #[serde(rename = "budgetExceeded")]
    pub budget_exceeded: bool,
    #[serde(rename = "apiUsage")]
    pub api_usage: UsageStats,
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch: Option<FetchSummary>,
}

#[cfg(test)]
impl SearchResponse {
    pub(crate) fn empty(page: u32) -> Self {
        Self {
            success: true,
            jobs: Vec::new(),
            count: 0,
            total_results: 0,
            has_more: false,
            page,
            cached: false,
            cache_status: CacheStatus::Live,
            cache_source: None,
            budget_exceeded: false,
            api_usage: UsageStats {
                daily: 0,
                budget: 1,
                remaining: 1,
                percentage: 0.0,
                is_peak_time: false,
                should_extend_cache: false,
            },
            priority: 50,
            fetch: None,
        }
    }
}

/// Jobs gathered by a multi-page fetch.
#[derive(Debug, Default)]
pub(crate) struct PageBatch {
    /// All pages, deduplicated by job id, in page order.
    pub jobs: Vec<JobPosting>,
    /// Each successful page as parsed.
    pub pages: Vec<(u32, Vec<JobPosting>)>,
    pub total_results: u64,
    pub pages_processed: u32,
}

/// The public surface of the cache/budget layer.
#[derive(Debug, Clone)]
pub struct JobSearchService {
    policy: CachePolicy,
    budget: Arc<BudgetTracker>,
    quick: QuickCache,
    stores: DualStore,
    source: Arc<dyn JobSource>,
    tracker: InteractionTracker,
    clock: Arc<dyn Clock>,
    country: String,
    results_per_page: u32,
    retention: chrono::Duration,
}

impl JobSearchService {
    pub fn new(config: &AppConfig, stores: DualStore, source: Arc<dyn JobSource>, clock: Arc<dyn Clock>) -> Self {
        let policy = CachePolicy::new(config.policy.clone(), clock.clone());
        let budget = Arc::new(BudgetTracker::new(config.daily_budget, config.policy.warning_ratio, clock.clone()));
        Self {
            policy,
            budget,
            quick: QuickCache::new(config.quick_cache_ttl(), config.quick_cache_capacity),
            tracker: InteractionTracker::new(stores.clone(), clock.clone()),
            stores,
            source,
            clock,
            country: config.country.to_lowercase(),
            results_per_page: config.results_per_page,
            retention: config.retention(),
        }
    }

    pub fn budget(&self) -> &Arc<BudgetTracker> {
        &self.budget
    }

    pub fn tracker(&self) -> &InteractionTracker {
        &self.tracker
    }

    /// Serve a search from the cheapest tier that satisfies it.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if the keywords are blank
    /// - `Error::BudgetExceeded` if the budget is spent and nothing is cached
    /// - `Error::ExternalApi` if the single-page fetch fails
    pub async fn search(&self, params: SearchParams, user: &UserContext) -> Result<SearchResponse, Error> {
        self.budget.refresh();

        if params.keywords.trim().is_empty() {
            return Err(Error::InvalidInput("keywords cannot be empty".into()));
        }

        let country = params.country.as_deref().unwrap_or(&self.country);
        let query = SearchQuery::new(&params.keywords, &params.location, params.page, country);
        let cache_key = query.cache_key();
        let priority = self.policy.priority(
            &query.normalized_keywords,
            &query.normalized_location,
            user.user_type,
            user.last_search_at,
        );
        let high_priority = self.policy.is_high_priority(priority);

        if let Some(hit) = self.quick.get(&cache_key).await {
            let response = SearchResponse {
                cached: true,
                cache_status: CacheStatus::Instant,
                api_usage: self.usage_stats(),
                priority,
                ..hit
            };
            self.log_query(&query, user, &response);
            return Ok(response);
        }

        let usage = self.usage_stats();
        let ratio = self.budget.usage_ratio();
        let ttl = self.policy.effective_ttl(
            &query.normalized_keywords,
            &query.normalized_location,
            user.user_type,
            usage.should_extend_cache,
        );

        if let Lookup::Hit { entry, source } = self.stores.lookup(&cache_key, ttl, self.clock.now()).await {
            let age = entry.age(self.clock.now());
            if self.policy.should_bypass_cache(high_priority, usage.is_peak_time, age, ratio) {
                tracing::info!(
                    cache_key = %cache_key,
                    priority,
                    age_minutes = age.num_minutes(),
                    "refreshing cached results for high-priority peak request"
                );
            } else {
                let mut response =
                    self.build_response(&query, &entry.jobs, entry.total_results, CacheStatus::Cached, priority);
                response.cache_source = Some(source);
                self.log_query(&query, user, &response);
                return Ok(response);
            }
        }

        if self.budget.is_exceeded() {
            return self.serve_over_budget(&query, user, priority).await;
        }

        let response = if query.is_new_search() {
            match self.fetch_new_search(&query, usage.is_peak_time, priority).await {
                Some(response) => response,
                None => self.fetch_single(&query, priority).await?,
            }
        } else {
            self.fetch_single(&query, priority).await?
        };

        self.quick.insert(cache_key, response.clone()).await;
        self.log_query(&query, user, &response);
        Ok(response)
    }

    /// Record a click on a job without waiting for the stores.
    pub fn track_click(&self, job_id: &str, user: &UserContext) {
        drop(self.tracker.record_interaction(job_id, InteractionKind::Click, user, serde_json::Value::Null));
    }

    /// Remove persisted entries older than the retention window.
    pub async fn cleanup_expired(&self) -> u64 {
        self.tracker.cleanup_expired(self.retention).await
    }

    pub fn usage_stats(&self) -> UsageStats {
        self.budget.stats(&self.policy)
    }

    pub fn clear_quick_cache(&self) {
        self.quick.clear();
    }

    async fn serve_over_budget(
        &self, query: &SearchQuery, user: &UserContext, priority: u8,
    ) -> Result<SearchResponse, Error> {
        let ttl = self
            .policy
            .extended_ttl(&query.normalized_keywords, &query.normalized_location, user.user_type);

        match self.stores.lookup(&query.cache_key(), ttl, self.clock.now()).await {
            Lookup::Hit { entry, source } => {
                let mut response =
                    self.build_response(query, &entry.jobs, entry.total_results, CacheStatus::Extended, priority);
                response.cache_source = Some(source);
                response.budget_exceeded = true;
                self.log_query(query, user, &response);
                Ok(response)
            }
            Lookup::Miss => {
                let state = self.budget.state();
                tracing::warn!(
                    cache_key = %query.cache_key(),
                    used = state.daily_count,
                    budget = self.budget.daily_budget(),
                    "budget exhausted with no cached fallback"
                );
                Err(Error::BudgetExceeded { used: state.daily_count, budget: self.budget.daily_budget() })
            }
        }
    }

    /// Pre-fetch several pages for a new search. `None` when every page failed.
    async fn fetch_new_search(&self, query: &SearchQuery, peak: bool, priority: u8) -> Option<SearchResponse> {
        let planned = self.policy.max_pages(peak, self.budget.usage_ratio());
        let max_pages = planned.min(self.budget.remaining());
        let batch = self.fetch_pages(query, max_pages, self.policy.page_delay(peak)).await;

        if batch.pages_processed == 0 {
            tracing::warn!(
                cache_key = %query.cache_key(),
                max_pages,
                "multi-page fetch returned nothing; falling back to a single page"
            );
            return None;
        }

        let fetched_at = self.clock.now();
        let aggregate = CacheEntry {
            cache_key: query.cache_key(),
            jobs: batch.jobs,
            fetched_at,
            total_results: batch.total_results,
        };
        self.stores.persist(&aggregate).await;
        for (page, jobs) in batch.pages {
            let entry = CacheEntry { cache_key: query.page_key(page), jobs, fetched_at, total_results: batch.total_results };
            self.stores.persist(&entry).await;
        }

        let per_page = self.results_per_page as usize;
        let mut response =
            self.build_response(query, &aggregate.jobs, aggregate.total_results, CacheStatus::Live, priority);
        response.fetch = Some(FetchSummary {
            total_fetched: aggregate.jobs.len(),
            pages_processed: batch.pages_processed,
            has_more: aggregate.jobs.len() > per_page,
        });

        tracing::info!(
            cache_key = %aggregate.cache_key,
            pages_processed = batch.pages_processed,
            max_pages,
            total_fetched = aggregate.jobs.len(),
            "multi-page fetch complete"
        );
        Some(response)
    }

    /// Fetch API pages `1..=max_pages` in order. Failed pages are skipped.
    pub(crate) async fn fetch_pages(&self, query: &SearchQuery, max_pages: u32, delay: StdDuration) -> PageBatch {
        let ctx = self.parse_context(query);
        let mut batch = PageBatch::default();
        let mut seen = HashSet::new();

        for page in 1..=max_pages {
            if page > 1 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.budget.record_call();
            let raw = match self.source.fetch_page(query, page, self.results_per_page).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(page, source = self.source.name(), error = %e, "page fetch failed; skipping");
                    continue;
                }
            };

            let jobs = parse_records(&raw.records, &ctx);
            batch.total_results = batch.total_results.max(raw.count);
            batch
                .jobs
                .extend(jobs.iter().filter(|job| seen.insert(job.id.clone())).cloned());
            batch.pages.push((page, jobs));
            batch.pages_processed += 1;

            if raw.records.len() < self.results_per_page as usize {
                tracing::debug!(page, "short page; no further results");
                break;
            }
        }

        batch
    }

    async fn fetch_single(&self, query: &SearchQuery, priority: u8) -> Result<SearchResponse, Error> {
        let page = query.page.max(1);
        self.budget.record_call();

        let raw = self
            .source
            .fetch_page(query, page, self.results_per_page)
            .await
            .map_err(|source| {
                tracing::error!(page, cache_key = %query.cache_key(), error = %source, "job API call failed");
                Error::ExternalApi { page, source }
            })?;

        let mut seen = HashSet::new();
        let jobs: Vec<JobPosting> = parse_records(&raw.records, &self.parse_context(query))
            .into_iter()
            .filter(|job| seen.insert(job.id.clone()))
            .collect();

        let entry = CacheEntry { cache_key: query.cache_key(), jobs, fetched_at: self.clock.now(), total_results: raw.count };
        self.stores.persist(&entry).await;

        Ok(self.build_response(query, &entry.jobs, entry.total_results, CacheStatus::Live, priority))
    }

    fn parse_context(&self, query: &SearchQuery) -> ParseContext {
        ParseContext { source: self.source.name().to_string(), country: query.country.clone(), now: self.clock.now() }
    }

    fn build_response(
        &self, query: &SearchQuery, jobs: &[JobPosting], total_results: u64, status: CacheStatus, priority: u8,
    ) -> SearchResponse {
        let per_page = self.results_per_page as usize;
        let shown: Vec<JobPosting> = jobs.iter().take(per_page).cloned().collect();
        let seen_through = u64::from(query.page.max(1)) * per_page as u64;

        SearchResponse {
            success: true,
            count: shown.len(),
            jobs: shown,
            total_results,
            has_more: jobs.len() > per_page || total_results > seen_through,
            page: query.page,
            cached: status.is_cached(),
            cache_status: status,
            cache_source: None,
            budget_exceeded: false,
            api_usage: self.usage_stats(),
            priority,
            fetch: None,
        }
    }

    fn log_query(&self, query: &SearchQuery, user: &UserContext, response: &SearchResponse) {
        tracing::info!(
            keywords = %query.normalized_keywords,
            location = %query.normalized_location,
            page = query.page,
            user_type = user.user_type.as_str(),
            cache_status = ?response.cache_status,
            count = response.count,
            priority = response.priority,
            "search served"
        );
    }
}
