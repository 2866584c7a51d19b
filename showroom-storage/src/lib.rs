//! Showroom Storage
//!
//! Backing stores and the entity cache.
//!
//! The ambient profile store is abstracted behind [`KeyValueStore`] so the
//! resolver can be handed either the LMDB-backed [`LmdbStore`] or the
//! in-memory [`InMemoryStore`] used by tests. [`LocalCache`] layers the
//! entity record format on top.
//!
//! Records are never expired. A record is overwritten by the next successful
//! resolution of the same id and last writer wins.

pub mod freshness;
pub mod lmdb_backend;
pub mod local_cache;
pub mod memory;
pub mod traits;

pub use freshness::CachedEntity;
pub use lmdb_backend::LmdbStore;
pub use local_cache::LocalCache;
pub use memory::InMemoryStore;
pub use traits::{CacheStats, KeyValueStore};
