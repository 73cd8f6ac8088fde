use crate::types::SearchResult;

/// Pages fetched so far for the current query, and whether more exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationAccumulator {
    results: Vec<SearchResult>,
    current_page: u32,
    has_more: bool,
}

impl Default for PaginationAccumulator {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            current_page: 1,
            has_more: false,
        }
    }
}

impl PaginationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_for_new_query(&mut self) {
        self.results.clear();
        self.current_page = 1;
        self.has_more = false;
    }

    /// First page of a new query; replaces everything shown so far.
    pub fn replace(&mut self, results: Vec<SearchResult>, has_more: bool) {
        self.reset_for_new_query();
        self.results = results;
        self.has_more = has_more;
    }

    /// Appends as-is. Items the backend repeats across pages show up twice.
    pub fn append_page(&mut self, results: Vec<SearchResult>, has_more: bool) {
        self.results.extend(results);
        self.has_more = has_more;
        self.current_page += 1;
    }

    pub fn can_load_more(&self, loading: bool) -> bool {
        !loading && self.has_more
    }

    pub fn next_page(&self) -> u32 {
        self.current_page + 1
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
