use serde::{Deserialize, Serialize};

/// A post as projected by the backend search endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub has_more: bool,
}

fn first_page() -> u32 {
    1
}

// Body of `GET /api/search`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One persisted page of results.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub results: Vec<SearchResult>,
    pub has_more: bool,
    /// Epoch milliseconds at write time.
    pub timestamp: i64,
}

/// What a UI renders: the coordinator's session state at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub search: String,
    pub results: Vec<SearchResult>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub current_page: u32,
    pub selected_index: Option<usize>,
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self {
            search: String::new(),
            results: Vec::new(),
            loading: false,
            error: None,
            has_more: false,
            current_page: 1,
            selected_index: None,
        }
    }
}
