//! SQLite-backed persistent stores.
//!
//! Each store is its own database accessed through tokio-rusqlite, with:
//!
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - A job cache keyed by canonical search key
//! - An append-only interaction log

pub mod connection;
pub mod entries;
pub mod interactions;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
