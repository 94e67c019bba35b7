//! Cache-policy engine.
//!
//! Decides how long cached results stay usable, how urgently a request wants
//! fresh data, and how aggressively a new search pre-fetches pages. Every
//! function here is pure over its inputs and the [`PolicyConfig`]; the clock is
//! only read by [`CachePolicy::is_peak_time`].

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::clock::Clock;
use crate::config::PolicyConfig;
use crate::model::UserType;
use crate::normalize::{normalize, normalize_location};

/// Canonical titles searched often enough that their results are shared widely.
const POPULAR_TITLES: &[&str] = &[
    "software engineer",
    "data scientist",
    "data analyst",
    "product manager",
    "project manager",
    "nurse",
    "teacher",
    "accountant",
    "sales representative",
    "marketing manager",
];

/// Canonical locations whose job markets move slowly.
const STABLE_LOCATIONS: &[&str] = &[
    "new york",
    "san francisco",
    "los angeles",
    "washington dc",
    "seattle",
    "boston",
    "chicago",
    "london",
    "manchester",
];

const FAST_INDUSTRY_KEYWORDS: &[&str] = &[
    "software",
    "developer",
    "engineer",
    "data",
    "machine learning",
    "devops",
    "crypto",
    "blockchain",
    "startup",
    "marketing",
];

const STABLE_INDUSTRY_KEYWORDS: &[&str] = &[
    "government",
    "civil service",
    "education",
    "teacher",
    "nurse",
    "healthcare",
    "accountant",
    "finance",
    "legal",
    "lawyer",
];

const BASE_PRIORITY: u32 = 50;
const NEW_USER_BONUS: u32 = 30;
const LOCATION_BONUS: u32 = 20;
const UNCOMMON_TITLE_BONUS: u32 = 15;
const STALE_HISTORY_BONUS: u32 = 10;
const MAX_PRIORITY: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Industry {
    FastMoving,
    Stable,
    Other,
}

pub fn is_popular_title(term: &str) -> bool {
    POPULAR_TITLES.contains(&normalize(term).as_str())
}

pub fn is_stable_location(location: &str) -> bool {
    STABLE_LOCATIONS.contains(&normalize_location(location).as_str())
}

pub fn classify_industry(term: &str) -> Industry {
    let term = normalize(term);
    if FAST_INDUSTRY_KEYWORDS.iter().any(|k| term.contains(k)) {
        Industry::FastMoving
    } else if STABLE_INDUSTRY_KEYWORDS.iter().any(|k| term.contains(k)) {
        Industry::Stable
    } else {
        Industry::Other
    }
}

/// Cache-policy engine bound to a set of thresholds and a clock.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    config: PolicyConfig,
    clock: Arc<dyn Clock>,
}

impl CachePolicy {
    pub fn new(config: PolicyConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn base_ttl(&self) -> Duration {
        Duration::hours(self.config.base_ttl_hours)
    }

    /// TTL from the role and location alone.
    ///
    /// Rules in priority order: popular title, stable location, new user
    /// (half of base for a fresher first impression), base.
    pub fn cache_duration(&self, term: &str, location: &str, user_type: UserType) -> Duration {
        if is_popular_title(term) {
            Duration::hours(self.config.popular_title_ttl_hours)
        } else if is_stable_location(location) {
            Duration::hours(self.config.stable_location_ttl_hours)
        } else if user_type == UserType::New {
            self.base_ttl() / 2
        } else {
            self.base_ttl()
        }
    }

    /// TTL from how quickly the term's industry changes.
    pub fn industry_duration(&self, term: &str) -> Duration {
        match classify_industry(term) {
            Industry::FastMoving => Duration::hours(self.config.fast_industry_ttl_hours),
            Industry::Stable => Duration::hours(self.config.stable_industry_ttl_hours),
            Industry::Other => self.base_ttl(),
        }
    }

    /// The shorter of the role/location and industry TTLs.
    pub fn base_effective_ttl(&self, term: &str, location: &str, user_type: UserType) -> Duration {
        self.cache_duration(term, location, user_type).min(self.industry_duration(term))
    }

    /// TTL used for the regular persistent lookup.
    pub fn effective_ttl(&self, term: &str, location: &str, user_type: UserType, extend: bool) -> Duration {
        let ttl = self.base_effective_ttl(term, location, user_type);
        if extend { ttl * self.config.extend_multiplier } else { ttl }
    }

    /// TTL for the last-resort lookup once the budget is spent.
    pub fn extended_ttl(&self, term: &str, location: &str, user_type: UserType) -> Duration {
        self.base_effective_ttl(term, location, user_type) * self.config.extended_lookup_multiplier
    }

    pub fn should_extend_cache(&self, daily_usage: u32, daily_budget: u32) -> bool {
        usage_ratio(daily_usage, daily_budget) >= self.config.warning_ratio
    }

    /// Heuristic 0-100 score of how much a request benefits from fresh data.
    pub fn priority(
        &self, term: &str, location: &str, user_type: UserType, last_search_at: Option<DateTime<Utc>>,
    ) -> u8 {
        let mut score = BASE_PRIORITY;
        if user_type == UserType::New {
            score += NEW_USER_BONUS;
        }
        if !normalize_location(location).is_empty() {
            score += LOCATION_BONUS;
        }
        if !is_popular_title(term) {
            score += UNCOMMON_TITLE_BONUS;
        }
        if let Some(last) = last_search_at
            && self.clock.now() - last > Duration::hours(self.config.stale_search_hours)
        {
            score += STALE_HISTORY_BONUS;
        }
        score.min(MAX_PRIORITY) as u8
    }

    pub fn is_high_priority(&self, priority: u8) -> bool {
        priority > self.config.high_priority_threshold
    }

    pub fn is_peak_hour(&self, hour: u32) -> bool {
        self.config.peak_windows.iter().any(|w| w.contains(hour))
    }

    pub fn is_peak_time(&self) -> bool {
        self.is_peak_hour(self.clock.local().hour())
    }

    /// Whether a cache hit should be skipped in favour of a live fetch.
    pub fn should_bypass_cache(&self, high_priority: bool, peak: bool, cache_age: Duration, usage: f64) -> bool {
        high_priority
            && peak
            && cache_age > Duration::minutes(self.config.bypass_min_age_minutes)
            && usage < self.config.bypass_max_usage_ratio
    }

    /// Pages to pre-fetch for a new search.
    pub fn max_pages(&self, peak: bool, usage: f64) -> u32 {
        if peak && usage > self.config.peak_pages_usage_ratio {
            self.config.peak_pages
        } else if usage < self.config.low_usage_ratio {
            self.config.low_usage_pages
        } else {
            self.config.default_pages
        }
    }

    /// Pause between consecutive page calls.
    pub fn page_delay(&self, peak: bool) -> StdDuration {
        StdDuration::from_millis(if peak { self.config.peak_page_delay_ms } else { self.config.page_delay_ms })
    }
}

/// `usage / budget`, with an empty budget counting as exhausted.
pub fn usage_ratio(daily_usage: u32, daily_budget: u32) -> f64 {
    if daily_budget == 0 {
        return 1.0;
    }
    f64::from(daily_usage) / f64::from(daily_budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::PeakWindow;
    use chrono::TimeZone;

    fn clock_at(hour: u32) -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 10, hour, 15, 0).unwrap()))
    }

    fn policy() -> CachePolicy {
        CachePolicy::new(PolicyConfig::default(), clock_at(11))
    }

    #[test]
    fn test_cache_duration_rules_in_order() {
        let p = policy();
        assert_eq!(p.cache_duration("Software Developer", "Leeds", UserType::New), Duration::hours(48));
        assert_eq!(p.cache_duration("Plumber", "London", UserType::New), Duration::hours(168));
        assert_eq!(p.cache_duration("Plumber", "Leeds", UserType::New), Duration::hours(12));
        assert_eq!(p.cache_duration("Plumber", "Leeds", UserType::Returning), Duration::hours(24));
    }

    #[test]
    fn test_new_user_gets_half_ttl() {
        let p = policy();
        for (term, location) in [("plumber", "leeds"), ("chef", ""), ("electrician", "bristol")] {
            let new = p.cache_duration(term, location, UserType::New);
            let returning = p.cache_duration(term, location, UserType::Returning);
            assert_eq!(new * 2, returning, "{term} in {location}");
        }
    }

    #[test]
    fn test_industry_duration() {
        let p = policy();
        assert_eq!(p.industry_duration("Blockchain Developer"), Duration::hours(12));
        assert_eq!(p.industry_duration("Primary Teacher"), Duration::hours(72));
        assert_eq!(p.industry_duration("Chef"), Duration::hours(24));
    }

    #[test]
    fn test_effective_ttl_takes_minimum() {
        let p = policy();
        // popular (48h) vs fast industry (12h)
        assert_eq!(p.effective_ttl("Software Engineer", "New York", UserType::New, false), Duration::hours(12));
        // stable location (7d) vs stable industry (72h)
        assert_eq!(p.effective_ttl("Legal Secretary", "London", UserType::Returning, false), Duration::hours(72));
        // popular (48h) vs stable industry (72h)
        assert_eq!(p.effective_ttl("Nurse", "Leeds", UserType::Returning, false), Duration::hours(48));
    }

    #[test]
    fn test_extended_ttls() {
        let p = policy();
        assert_eq!(p.effective_ttl("Chef", "Leeds", UserType::Returning, true), Duration::hours(48));
        assert_eq!(p.extended_ttl("Chef", "Leeds", UserType::Returning), Duration::hours(72));
    }

    #[test]
    fn test_should_extend_cache_boundary() {
        let p = policy();
        assert!(p.should_extend_cache(800, 1000));
        assert!(!p.should_extend_cache(799, 1000));
        assert!(p.should_extend_cache(4, 5));
        assert!(!p.should_extend_cache(3, 5));
        assert!(p.should_extend_cache(0, 0));
    }

    #[test]
    fn test_priority_components() {
        let p = policy();
        assert_eq!(p.priority("software engineer", "", UserType::Returning, None), 50);
        assert_eq!(p.priority("software engineer", "", UserType::New, None), 80);
        assert_eq!(p.priority("software engineer", "leeds", UserType::Returning, None), 70);
        assert_eq!(p.priority("plumber", "", UserType::Returning, None), 65);
    }

    #[test]
    fn test_priority_clamped() {
        let clock = clock_at(11);
        let p = CachePolicy::new(PolicyConfig::default(), clock.clone());
        let stale = clock.now() - Duration::hours(30);
        assert_eq!(p.priority("plumber", "leeds", UserType::New, Some(stale)), 100);
        assert_eq!(p.priority("plumber", "leeds", UserType::New, None), 100);

        let recent = clock.now() - Duration::hours(2);
        assert_eq!(p.priority("plumber", "", UserType::Returning, Some(recent)), 65);
        assert_eq!(p.priority("plumber", "", UserType::Returning, Some(stale)), 75);
    }

    #[test]
    fn test_high_priority_threshold() {
        let p = policy();
        assert!(!p.is_high_priority(70));
        assert!(p.is_high_priority(71));
    }

    #[test]
    fn test_peak_time() {
        let p = policy();
        assert!(p.is_peak_hour(8));
        assert!(p.is_peak_hour(13));
        assert!(p.is_peak_hour(18));
        assert!(!p.is_peak_hour(10));
        assert!(!p.is_peak_hour(22));

        assert!(!CachePolicy::new(PolicyConfig::default(), clock_at(11)).is_peak_time());
        assert!(CachePolicy::new(PolicyConfig::default(), clock_at(12)).is_peak_time());

        let config = PolicyConfig { peak_windows: vec![PeakWindow::new(0, 24)], ..Default::default() };
        assert!(CachePolicy::new(config, clock_at(3)).is_peak_time());
    }

    #[test]
    fn test_bypass_conditions() {
        let p = policy();
        let old = Duration::minutes(90);
        assert!(p.should_bypass_cache(true, true, old, 0.2));
        assert!(!p.should_bypass_cache(false, true, old, 0.2));
        assert!(!p.should_bypass_cache(true, false, old, 0.2));
        assert!(!p.should_bypass_cache(true, true, Duration::minutes(30), 0.2));
        assert!(!p.should_bypass_cache(true, true, old, 0.5));
    }

    #[test]
    fn test_max_pages_tiers() {
        let p = policy();
        assert_eq!(p.max_pages(false, 0.0), 7);
        assert_eq!(p.max_pages(true, 0.0), 7);
        assert_eq!(p.max_pages(false, 0.4), 5);
        assert_eq!(p.max_pages(true, 0.7), 3);
        assert_eq!(p.max_pages(false, 0.7), 5);
    }

    #[test]
    fn test_page_delay() {
        let p = policy();
        assert_eq!(p.page_delay(true), StdDuration::from_millis(1500));
        assert_eq!(p.page_delay(false), StdDuration::from_millis(500));
    }
}
