use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::models::ConsistencyIndex;

/// Response header (`X-Consul-Index`) carrying the blocking-query index.
pub const INDEX_HEADER: &str = "x-consul-index";

/// Read the consistency index from response headers, if present and numeric.
pub fn parse_index(headers: &HeaderMap) -> Option<ConsistencyIndex> {
    headers
        .get(INDEX_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(ConsistencyIndex::new)
}

/// Format a blocking bound the way the server expects it, e.g. `55s`.
pub fn format_wait(wait: Duration) -> String {
    format!("{}s", wait.as_secs().max(1))
}
