//! job-cache server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use jobcache_client::AdzunaClient;
use jobcache_core::{AppConfig, CacheDb, DualStore, JobSearchService, SystemClock};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    let primary = CacheDb::open("primary", &config.primary_db_path)
        .await
        .with_context(|| format!("failed to open primary store at {}", config.primary_db_path.display()))?;
    let secondary = CacheDb::open("secondary", &config.secondary_db_path)
        .await
        .with_context(|| format!("failed to open secondary store at {}", config.secondary_db_path.display()))?;

    let client = AdzunaClient::from_config(&config).context("failed to build job API client")?;
    let service = JobSearchService::new(
        &config,
        DualStore::new(Arc::new(primary), Arc::new(secondary)),
        Arc::new(client),
        Arc::new(SystemClock),
    );

    tracing::info!(
        daily_budget = config.daily_budget,
        country = %config.country,
        "Starting job-cache server on stdio transport"
    );

    let handler = handler::JobCacheServer::new(service);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
