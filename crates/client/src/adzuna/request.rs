//! Job search request parameters and validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::AdzunaError;

/// Largest page size the API accepts.
pub const MAX_RESULTS_PER_PAGE: u32 = 50;

static COUNTRY_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]{2}$").expect("static regex"));

/// One page of a job search.
///
/// `page` and `country` are path segments; the rest serialize as query
/// parameters.
#[derive(Debug, Clone, Serialize)]
pub struct JobsRequest {
    /// Search keywords.
    pub what: String,

    /// Location filter; omitted when empty.
    #[serde(rename = "where", skip_serializing_if = "String::is_empty")]
    pub location: String,

    /// Results per page (1-50).
    pub results_per_page: u32,

    /// 1-based page number.
    #[serde(skip)]
    pub page: u32,

    /// Lowercase ISO 3166-1 alpha-2 code, e.g. "gb".
    #[serde(skip)]
    pub country: String,
}

impl JobsRequest {
    pub fn new(what: impl Into<String>, location: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            location: location.into(),
            results_per_page: 10,
            page: 1,
            country: country.into().to_lowercase(),
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn results_per_page(mut self, results_per_page: u32) -> Self {
        self.results_per_page = results_per_page;
        self
    }

    /// Validate the request parameters.
    ///
    /// Returns an error if any parameters are out of range or malformed.
    pub fn validate(&self) -> Result<(), AdzunaError> {
        if self.what.trim().is_empty() {
            return Err(AdzunaError::InvalidQuery("query cannot be empty".to_string()));
        }

        if self.page == 0 {
            return Err(AdzunaError::InvalidPage);
        }

        if !(1..=MAX_RESULTS_PER_PAGE).contains(&self.results_per_page) {
            return Err(AdzunaError::InvalidResultsPerPage);
        }

        if !COUNTRY_CODE.is_match(&self.country) {
            return Err(AdzunaError::InvalidCountry(self.country.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let req = JobsRequest::new("rust developer", "London", "GB").page(2).results_per_page(20);
        assert!(req.validate().is_ok());
        assert_eq!(req.country, "gb");
    }

    #[test]
    fn test_empty_query() {
        let req = JobsRequest::new("  ", "London", "gb");
        assert!(matches!(req.validate(), Err(AdzunaError::InvalidQuery(_))));
    }

    #[test]
    fn test_invalid_page() {
        let req = JobsRequest::new("chef", "", "gb").page(0);
        assert!(matches!(req.validate(), Err(AdzunaError::InvalidPage)));
    }

    #[test]
    fn test_invalid_results_per_page() {
        for n in [0, 51] {
            let req = JobsRequest::new("chef", "", "gb").results_per_page(n);
            assert!(matches!(req.validate(), Err(AdzunaError::InvalidResultsPerPage)));
        }
    }

    #[test]
    fn test_invalid_country() {
        for country in ["gbr", "g", "g1"] {
            let req = JobsRequest::new("chef", "", country);
            assert!(matches!(req.validate(), Err(AdzunaError::InvalidCountry(_))), "{country}");
        }
    }

    #[test]
    fn test_query_params() {
        let req = JobsRequest::new("chef", "", "gb").page(3);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"what": "chef", "results_per_page": 10}));

        let req = JobsRequest::new("chef", "Leeds", "gb");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["where"], "Leeds");
    }
}
