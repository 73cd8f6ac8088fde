use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Backend origin; `/api/search` is resolved against it.
    pub api_url: String,
    pub id_token: Option<String>,
    pub cache_path: PathBuf,
    pub debounce: Duration,
    pub cache_ttl: Duration,
    pub cache_max_entries: Option<usize>,
    pub http_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            id_token: None,
            cache_path: default_cache_path(),
            debounce: DEFAULT_DEBOUNCE,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_max_entries: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: var("FANZONE_API_URL").unwrap_or(defaults.api_url),
            id_token: var("FANZONE_ID_TOKEN").filter(|t| !t.trim().is_empty()),
            cache_path: var("FANZONE_SEARCH_CACHE")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            debounce: Duration::from_millis(try_load("FANZONE_DEBOUNCE_MS", 300)),
            cache_ttl: Duration::from_secs(try_load("FANZONE_CACHE_TTL_SECS", 1800)),
            cache_max_entries: var("FANZONE_CACHE_MAX_ENTRIES").and_then(|raw| {
                raw.parse::<usize>()
                    .map_err(|e| warn!("Invalid FANZONE_CACHE_MAX_ENTRIES value: {e}"))
                    .ok()
                    .filter(|max| *max > 0)
            }),
            http_timeout: Duration::from_secs(try_load("FANZONE_HTTP_TIMEOUT_SECS", 30)),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value: {e}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("fanzone-search")
        .join("search-cache.json")
}
