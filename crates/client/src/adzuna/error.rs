//! Job API client error types.

use std::sync::Arc;

use jobcache_core::SourceError;

/// Errors from the job API client.
#[derive(Debug, thiserror::Error)]
pub enum AdzunaError {
    /// app_id or app_key not configured.
    #[error("missing credential: {0}")]
    MissingCredentials(String),

    /// Base URL could not be parsed or cannot carry a path.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Invalid search keywords.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Pages are 1-based.
    #[error("invalid page: must be at least 1")]
    InvalidPage,

    /// Invalid results_per_page parameter (must be 1-50).
    #[error("invalid results_per_page: must be 1-50")]
    InvalidResultsPerPage,

    /// Country must be a two-letter code.
    #[error("invalid country code: {0}")]
    InvalidCountry(String),

    /// Authentication failed (bad app_id/app_key).
    #[error("authentication failed: invalid app credentials")]
    AuthError,

    /// Rate limited by the API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AdzunaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { AdzunaError::Timeout } else { AdzunaError::Network(Arc::new(err)) }
    }
}

impl From<AdzunaError> for SourceError {
    fn from(err: AdzunaError) -> Self {
        match err {
            AdzunaError::AuthError | AdzunaError::MissingCredentials(_) => SourceError::Auth,
            AdzunaError::RateLimited => SourceError::RateLimited,
            AdzunaError::HttpError { status } => SourceError::Http { status },
            AdzunaError::Timeout => SourceError::Timeout,
            AdzunaError::Network(e) => SourceError::Network(e.to_string()),
            AdzunaError::Parse(msg) => SourceError::Parse(msg),
            e @ (AdzunaError::InvalidBaseUrl(_)
            | AdzunaError::InvalidQuery(_)
            | AdzunaError::InvalidPage
            | AdzunaError::InvalidResultsPerPage
            | AdzunaError::InvalidCountry(_)) => SourceError::InvalidRequest(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdzunaError::MissingCredentials("app_id".to_string());
        assert!(err.to_string().contains("app_id"));

        let err = AdzunaError::InvalidQuery("test".to_string());
        assert!(err.to_string().contains("invalid query"));
    }

    #[test]
    fn test_source_error_mapping() {
        assert!(matches!(SourceError::from(AdzunaError::AuthError), SourceError::Auth));
        assert!(matches!(SourceError::from(AdzunaError::RateLimited), SourceError::RateLimited));
        assert!(matches!(
            SourceError::from(AdzunaError::HttpError { status: 502 }),
            SourceError::Http { status: 502 }
        ));
        assert!(matches!(SourceError::from(AdzunaError::InvalidPage), SourceError::InvalidRequest(_)));
    }
}
