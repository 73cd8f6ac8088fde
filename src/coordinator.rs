use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::auth::{StaticTokenProvider, TokenProvider};
use crate::backend::{HttpSearchBackend, SearchBackend};
use crate::cache::{cache_key, FileStore, ResultCache};
use crate::config::SearchConfig;
use crate::debounce::{DebounceState, Debouncer};
use crate::error::SearchError;
use crate::pagination::PaginationAccumulator;
use crate::types::{SearchResult, SearchSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Replace,
    Append,
}

#[derive(Default)]
struct Session {
    search: String,
    // Query behind the results on screen; load-more continues it
    active_query: String,
    pages: PaginationAccumulator,
    loading: bool,
    error: Option<String>,
    selected: Option<usize>,
}

impl Session {
    fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            search: self.search.clone(),
            results: self.pages.results().to_vec(),
            loading: self.loading,
            error: self.error.clone(),
            has_more: self.pages.has_more(),
            current_page: self.pages.current_page(),
            selected_index: self.selected,
        }
    }
}

struct Inner {
    backend: Arc<dyn SearchBackend>,
    auth: Arc<dyn TokenProvider>,
    cache: ResultCache,
    debouncer: Debouncer,
    session: Mutex<Session>,
    latest: AtomicU64,
    updates: watch::Sender<SearchSnapshot>,
}

// One UI's search session. Responses are applied only while their sequence
// number is still the newest dispatched.
#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<Inner>,
}

impl SearchCoordinator {
    /// Must be built inside a Tokio runtime. The handle it returns can then be
    /// driven from any thread.
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        auth: Arc<dyn TokenProvider>,
        cache: ResultCache,
        debounce: Duration,
    ) -> Self {
        let (updates, _) = watch::channel(SearchSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                auth,
                cache,
                debouncer: Debouncer::new(debounce),
                session: Mutex::new(Session::default()),
                latest: AtomicU64::new(0),
                updates,
            }),
        }
    }

    /// Wires the HTTP backend, a file-backed cache and a static token.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        let backend = HttpSearchBackend::new(&config.api_url, http_client)?;
        let cache = ResultCache::new(
            Arc::new(FileStore::new(config.cache_path.clone())),
            config.cache_ttl,
        )
        .with_max_entries(config.cache_max_entries);
        let auth = StaticTokenProvider::new(config.id_token.clone());

        Ok(Self::new(
            Arc::new(backend),
            Arc::new(auth),
            cache,
            config.debounce,
        ))
    }

    pub fn handle_search(&self, query: &str) {
        let trimmed = query.trim().to_string();
        self.inner.invalidate();

        {
            let mut session = self.inner.lock();
            session.search = query.to_string();
            session.selected = None;

            if trimmed.is_empty() {
                self.inner.debouncer.cancel();
                session.pages.reset_for_new_query();
                session.active_query.clear();
                session.loading = false;
                session.error = None;
                self.inner.publish(&session);
                return;
            }

            session.loading = true;
            self.inner.publish(&session);
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        self.inner.debouncer.schedule(move || async move {
            // Coordinator dropped while the timer was pending
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let seq = inner.dispatch();
            info!("search fired for '{}'", trimmed);
            inner.fetch(trimmed, 1, FetchMode::Replace, seq).await;
        });
    }

    /// Fetches and appends the next page. No-op while loading or when the
    /// backend reported no further pages.
    pub async fn load_more(&self) {
        let (query, page, seq) = {
            let mut session = self.inner.lock();
            if !session.pages.can_load_more(session.loading) {
                debug!(
                    "load_more ignored (loading={}, has_more={})",
                    session.loading,
                    session.pages.has_more()
                );
                return;
            }
            session.loading = true;
            self.inner.publish(&session);
            (
                session.active_query.clone(),
                session.pages.next_page(),
                self.inner.dispatch(),
            )
        };

        info!("loading page {} for '{}'", page, query);
        self.inner.fetch(query, page, FetchMode::Append, seq).await;
    }

    pub fn select_next(&self) {
        let mut session = self.inner.lock();
        let len = session.pages.len();
        if len == 0 {
            return;
        }
        let next = match session.selected {
            None => 0,
            Some(i) => (i + 1).min(len - 1),
        };
        if session.selected != Some(next) {
            session.selected = Some(next);
            self.inner.publish(&session);
        }
    }

    pub fn select_previous(&self) {
        let mut session = self.inner.lock();
        let prev = match session.selected {
            None => return,
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
        session.selected = prev;
        self.inner.publish(&session);
    }

    pub fn selected_result(&self) -> Option<SearchResult> {
        let session = self.inner.lock();
        session
            .selected
            .and_then(|i| session.pages.results().get(i).cloned())
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.lock().snapshot()
    }

    /// Observe every state change, the way a UI would re-render.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.updates.subscribe()
    }

    pub fn debounce_state(&self) -> DebounceState {
        self.inner.debouncer.state()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.inner.cache
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Session> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn publish(&self, session: &Session) {
        self.updates.send_replace(session.snapshot());
    }

    fn dispatch(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }

    async fn fetch(&self, query: String, page: u32, mode: FetchMode, seq: u64) {
        let key = cache_key(&query, page);
        if let Some(entry) = self.cache.get(&key) {
            debug!("search cache hit for {}", key);
            self.apply(seq, mode, &query, entry.results, entry.has_more);
            return;
        }
        debug!("search cache miss for {}", key);

        {
            let mut session = self.lock();
            if !self.is_current(seq) {
                return;
            }
            session.loading = true;
            session.error = None;
            self.publish(&session);
        }

        let token = self.auth.id_token(true).await;
        match self.backend.search(&query, page, token.as_deref()).await {
            Ok(resp) => {
                let has_more = resp.pagination.has_more;
                self.cache.put(&key, &resp.results, has_more);
                self.apply(seq, mode, &query, resp.results, has_more);
            }
            Err(e) => {
                error!("Search error for {}: {}", key, e);
                self.fail(seq, e.user_message());
            }
        }
    }

    fn apply(
        &self,
        seq: u64,
        mode: FetchMode,
        query: &str,
        results: Vec<SearchResult>,
        has_more: bool,
    ) {
        let mut session = self.lock();
        if !self.is_current(seq) {
            debug!("discarding stale response for '{}'", query);
            return;
        }
        match mode {
            FetchMode::Replace => {
                session.pages.replace(results, has_more);
                session.active_query = query.to_string();
            }
            FetchMode::Append => session.pages.append_page(results, has_more),
        }
        session.loading = false;
        session.error = None;
        self.publish(&session);
    }

    fn fail(&self, seq: u64, message: String) {
        let mut session = self.lock();
        if !self.is_current(seq) {
            return;
        }
        // Results already on screen stay put
        session.error = Some(message);
        session.loading = false;
        self.publish(&session);
    }
}
