//! LMDB-backed profile store.
//!
//! Uses the heed crate (Rust bindings for LMDB) as the persistent key-value
//! store behind the entity cache. One environment directory corresponds to
//! one user profile; every key lives in a single unnamed database.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The store uses:
//! - Read transactions for `get`
//! - Write transactions for `set`

use std::path::Path;

use async_trait::async_trait;
use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};
use showroom_core::StoreError;

use crate::traits::KeyValueStore;

fn txn_error(e: heed::Error) -> StoreError {
    StoreError::Transaction {
        reason: e.to_string(),
    }
}

/// LMDB-backed key-value store.
///
/// # Example
///
/// ```ignore
/// use showroom_storage::{LmdbStore, LocalCache};
/// use std::sync::Arc;
///
/// let store = LmdbStore::open("/tmp/showroom-profile", 16)?;
/// let cache = LocalCache::new(Arc::new(store), "product_cache");
/// ```
pub struct LmdbStore {
    env: Env,
    db: Database<Str, Str>,
}

impl LmdbStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the LMDB
    /// environment or database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&path)?;

        // SAFETY: the environment directory is owned by this process for the
        // lifetime of the store; it is never opened twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| StoreError::Io {
            reason: format!("failed to open LMDB environment: {}", e),
        })?;

        let mut wtxn = env.write_txn().map_err(txn_error)?;
        let db: Database<Str, Str> = env.create_database(&mut wtxn, None).map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)?;

        Ok(Self { env, db })
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        self.db.len(&rtxn).map_err(txn_error)
    }
}

#[async_trait]
impl KeyValueStore for LmdbStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        let value = self.db.get(&rtxn, key).map_err(txn_error)?;
        Ok(value.map(str::to_string))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(txn_error)?;
        self.db.put(&mut wtxn, key, value).map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)?;
        Ok(())
    }
}
