pub mod auth;
pub mod backend;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod pagination;
pub mod types;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use backend::{HttpSearchBackend, SearchBackend};
pub use cache::{cache_key, CacheStore, FileStore, MemoryStore, ResultCache};
pub use config::SearchConfig;
pub use coordinator::SearchCoordinator;
pub use error::SearchError;
pub use types::*;
