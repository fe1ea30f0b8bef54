//! # Simdeck Storage Crate
//!
//! Hand-off between a batch run and a later look at its results. Each
//! simulation mode owns one key and a write replaces whatever was stored
//! under it.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** callers see only the `ResultStore` trait, so the backing
//!   medium can change without touching the binary.
//! - **Raw records:** values are stored as plain JSON and re-validated by the
//!   reader. Storage makes no promise that what it returns is well-formed.
//!
//! ## Public API
//!
//! - `ResultStore`: the async read/write trait.
//! - `JsonFileStore`: one `<key>.json` file per key under a directory.
//! - `MemoryStore`: process-local store, used by the binary's hand-off tests.
//! - `StorageError`: the specific error types that can be returned from this crate.

pub mod error;
pub mod file;
pub mod memory;

pub use error::StorageError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Replaces everything stored under `key` with `records`.
    async fn write(&self, key: &str, records: &[Value]) -> Result<(), StorageError>;

    /// Returns the records stored under `key`, or `None` if nothing was ever
    /// written there.
    async fn read(&self, key: &str) -> Result<Option<Vec<Value>>, StorageError>;
}

/// Keys become file names, so only a conservative character set is accepted.
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
