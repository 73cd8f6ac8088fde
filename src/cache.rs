use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{CacheEntry, SearchResult};

// Every page lives in one JSON object under a single store slot. Storage and
// parse failures are logged and read as misses.
pub fn cache_key(query: &str, page: u32) -> String {
    format!("{}_page{}", query, page)
}

/// A single-slot key-value store holding the serialized cache object.
pub trait CacheStore: Send + Sync {
    fn load(&self) -> io::Result<Option<String>>;
    fn save(&self, raw: &str) -> io::Result<()>;
}

/// Stores the cache object as a JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for FileStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, raw: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write beside the target and rename so readers never see half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> io::Result<Option<String>> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory store poisoned"))
    }

    fn save(&self, raw: &str) -> io::Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory store poisoned"))?;
        *slot = Some(raw.to_string());
        Ok(())
    }
}

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(millis(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    max_entries: Option<usize>,
    // Serializes read-merge-write within this process
    write_lock: Arc<Mutex<()>>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ttl,
            max_entries: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let mut entries = self.load_entries()?;
        let raw = entries.remove(key)?;
        let entry: CacheEntry = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring malformed search cache entry {}: {}", key, e);
                return None;
            }
        };

        let age = self.clock.now_millis().saturating_sub(entry.timestamp);
        if age >= millis(self.ttl) {
            debug!("search cache entry {} expired ({} ms old)", key, age);
            return None;
        }
        Some(entry)
    }

    pub fn put(&self, key: &str, results: &[SearchResult], has_more: bool) {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut entries = self.load_entries().unwrap_or_default();
        let entry = CacheEntry {
            results: results.to_vec(),
            has_more,
            timestamp: self.clock.now_millis(),
        };
        let value = match serde_json::to_value(&entry) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize search cache entry {}: {}", key, e);
                return;
            }
        };
        entries.insert(key.to_string(), value);

        if let Some(max) = self.max_entries {
            evict_oldest(&mut entries, max);
        }

        match serde_json::to_string(&entries) {
            Ok(raw) => {
                if let Err(e) = self.store.save(&raw) {
                    warn!("Failed to write search cache: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize search cache: {}", e),
        }
    }

    pub fn clear(&self) {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = self.store.save("{}") {
            warn!("Failed to clear search cache: {}", e);
        }
    }

    fn load_entries(&self) -> Option<HashMap<String, Value>> {
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read search cache: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!("Failed to parse search cache: {}", e);
                None
            }
        }
    }
}

// Saturates instead of wrapping for absurd TTLs
fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

fn evict_oldest(entries: &mut HashMap<String, Value>, max: usize) {
    if entries.len() <= max {
        return;
    }
    let mut by_age: Vec<(String, i64)> = entries
        .iter()
        .map(|(key, value)| {
            let ts = value
                .get("timestamp")
                .and_then(Value::as_i64)
                .unwrap_or(i64::MIN);
            (key.clone(), ts)
        })
        .collect();
    by_age.sort_by_key(|(_, ts)| *ts);

    let excess = entries.len() - max;
    for (key, _) in by_age.into_iter().take(excess) {
        debug!("evicting search cache entry {}", key);
        entries.remove(&key);
    }
}
