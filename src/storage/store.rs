//! Named blob storage
//!
//! The host's key-value store (IndexedDB via localforage in the browser) is
//! reduced to get/set/remove of string blobs.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored record '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store, used natively and as a mirror of the host store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.blobs.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.blobs.remove(key);
        Ok(())
    }
}
