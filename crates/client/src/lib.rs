//! Client code for job-cache.
//!
//! This crate provides the HTTP client for the paged job-search API, exposed
//! to the core orchestrator through [`jobcache_core::JobSource`].

pub mod adzuna;

pub use adzuna::{AdzunaClient, AdzunaConfig, AdzunaError, AdzunaResponse, JobsRequest};
