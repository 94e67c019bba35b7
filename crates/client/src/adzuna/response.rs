//! Job search API response types.

use jobcache_core::RawJobPage;
use serde::Deserialize;

/// Raw response from the job search endpoint.
///
/// Records stay as JSON values; the core parser handles them one at a time
/// so a single malformed record does not fail the page.
#[derive(Debug, Deserialize)]
pub struct AdzunaResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub mean: Option<f64>,
}

impl From<AdzunaResponse> for RawJobPage {
    fn from(raw: AdzunaResponse) -> Self {
        RawJobPage { count: raw.count, records: raw.results }
    }
}
