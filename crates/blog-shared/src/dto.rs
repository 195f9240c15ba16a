//! Data Transfer Objects - query strings and plain responses.

use serde::{Deserialize, Serialize};

/// Query string of the post listing, e.g. `?page=2` or `?page=last`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

/// Query string of the search page, e.g. `?query=ownership`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// Response of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Which content store serves requests: `postgres` or `memory`.
    pub store: String,
    pub timestamp: String,
}
