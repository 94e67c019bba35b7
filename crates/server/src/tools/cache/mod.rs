//! Cache maintenance MCP tools.

pub mod cleanup;
pub mod clear;

pub use cleanup::{CacheCleanupOutput, cleanup_impl};
pub use clear::clear_impl;
