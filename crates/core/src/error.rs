//! Unified error types for the job cache.
//!
//! Store and per-page failures are recovered close to where they happen; only
//! budget exhaustion and a failed single-page fetch reach the caller.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::source::SourceError;

/// Unified error types for the job cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty keywords).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A store could not be reached or refused the operation.
    #[error("STORE_UNAVAILABLE: {0}")]
    StoreUnavailable(String),

    /// Stored job payload could not be encoded or decoded.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(String),

    /// The external job API call on the single-page path failed.
    #[error("EXTERNAL_API_ERROR: page {page}: {source}")]
    ExternalApi {
        page: u32,
        #[source]
        source: SourceError,
    },

    /// Daily call budget exhausted and no cached fallback exists.
    #[error("BUDGET_EXCEEDED: {used}/{budget} calls used today and no cached results are available")]
    BudgetExceeded { used: u32, budget: u32 },
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::BudgetExceeded { .. } => -32020,
            Error::ExternalApi { .. } => -32021,
            Error::Database(_) | Error::MigrationFailed(_) | Error::StoreUnavailable(_) => -32002,
            Error::Serialization(_) => -32003,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BudgetExceeded { used: 1000, budget: 1000 };
        assert!(err.to_string().starts_with("BUDGET_EXCEEDED"));
        assert!(err.to_string().contains("1000/1000"));
    }

    #[test]
    fn test_external_api_error_keeps_source() {
        let err = Error::ExternalApi { page: 2, source: SourceError::RateLimited };
        assert!(err.to_string().contains("page 2"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::BudgetExceeded { used: 5, budget: 5 };
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32020);

        let mcp_err: McpError = Error::InvalidInput("keywords".into()).into();
        assert_eq!(mcp_err.code.0, -32602);
    }
}
