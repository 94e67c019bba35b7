//! Core types and shared functionality for job-cache.
//!
//! This crate provides:
//! - Search normalization and canonical cache keys
//! - TTL, priority, and page-count policy
//! - Daily API budget tracking
//! - Quick cache and dual SQLite-backed persistent stores
//! - The fetch orchestrator ([`JobSearchService`])
//! - Unified error types
//! - Configuration structures

pub mod budget;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod policy;
pub mod quick;
pub mod search;
pub mod source;
pub mod store;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use budget::{BudgetTracker, UsageStats};
pub use cache::CacheDb;
pub use clock::{Clock, SystemClock};
pub use config::AppConfig;
pub use error::Error;
pub use model::{InteractionKind, JobPosting, SearchParams, UserContext, UserType};
pub use policy::CachePolicy;
pub use search::{CacheStatus, JobSearchService, SearchResponse};
pub use source::{JobSource, RawJobPage, SourceError};
pub use store::{DualStore, JobStore};
