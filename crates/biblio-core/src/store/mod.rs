//! Persistent session storage.
//!
//! A `KeyValueStore` is a dumb durable map: `get`, `set` and `remove` on
//! string keys, with no validation or expiry. The session layer keeps the
//! logged-in user and both tokens here under the keys below.
//!
//! Three backends are provided:
//! - `MemoryStore`: process-local, used by tests and the `memory` backend
//! - `FileStore`: a single JSON object on disk
//! - `KeyringStore`: OS keychain, one entry per key

pub mod file;
pub mod keychain;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

pub use keychain::KeyringStore;
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::SessionBackend;

/// JSON-encoded `User` record
pub const USER_KEY: &str = "user";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Session file name in the cache directory
const SESSION_FILE: &str = "session.json";

/// Keychain service name
const KEYRING_SERVICE: &str = "biblio";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session store is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Keychain access failed: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session store lock poisoned")]
    Poisoned,
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Open the store selected in the configuration.
pub fn open(backend: SessionBackend, cache_dir: &Path) -> Arc<dyn KeyValueStore> {
    match backend {
        SessionBackend::File => Arc::new(FileStore::new(cache_dir.join(SESSION_FILE))),
        SessionBackend::Keyring => Arc::new(KeyringStore::new(KEYRING_SERVICE)),
        SessionBackend::Memory => Arc::new(MemoryStore::new()),
    }
}
