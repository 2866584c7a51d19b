//! Entity cache over a [`KeyValueStore`].
//!
//! Each resolved entity is stored as a JSON [`CacheRecord`] under
//! `"{namespace}:{id}"`. Unreadable records count as misses and are logged;
//! they never fail a resolution.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use showroom_core::{CacheRecord, Entity, StoreError};

use crate::freshness::CachedEntity;
use crate::traits::{CacheStats, KeyValueStore};

pub struct LocalCache {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    stats: Mutex<CacheStats>,
}

impl LocalCache {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key_for(&self, id: &str) -> String {
        format!("{}:{}", self.namespace, id)
    }

    /// Read the cached entity for `id`.
    ///
    /// A record whose embedded id differs from `id` is treated as a miss.
    pub async fn get(&self, id: &str) -> Result<Option<CachedEntity>, StoreError> {
        let key = self.key_for(id);
        let raw = match self.store.get(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                self.record(|s| s.misses += 1);
                return Err(e);
            }
        };

        let Some(raw) = raw else {
            self.record(|s| s.misses += 1);
            return Ok(None);
        };

        match serde_json::from_str::<CacheRecord>(&raw) {
            Ok(record) if record.id == id => {
                self.record(|s| s.hits += 1);
                Ok(Some(CachedEntity::from(record)))
            }
            Ok(record) => {
                tracing::warn!(key = %key, found = %record.id, "Cached record id does not match key");
                self.record(|s| s.misses += 1);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable cache record");
                self.record(|s| s.misses += 1);
                Ok(None)
            }
        }
    }

    /// Write `entity`, replacing whatever was cached for its id.
    pub async fn put(&self, entity: &Entity) -> Result<CacheRecord, StoreError> {
        let record = CacheRecord::new(entity.clone(), Utc::now());
        let encoded = serde_json::to_string(&record).map_err(|e| StoreError::Serialization {
            reason: e.to_string(),
        })?;
        self.store.set(&self.key_for(&entity.id), &encoded).await?;
        self.record(|s| s.writes += 1);
        tracing::debug!(entity_id = %entity.id, "Cached entity");
        Ok(record)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, f: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use proptest::prelude::*;
    use showroom_core::{Category, Specification};

    fn cache_with_store() -> (LocalCache, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let cache = LocalCache::new(store.clone(), "product_cache");
        (cache, store)
    }

    fn sample_entity(id: &str) -> Entity {
        Entity {
            id: id.to_string(),
            name: "Oak Dining Table".to_string(),
            price: 499.0,
            discount_price: Some(449.0),
            stock: 3,
            images: vec!["https://img.example.com/oak.jpg".to_string()],
            category: Category::new("680c9484ab11e96a288ef6da", "Tables"),
            specifications: vec![Specification::new("Material", "Oak")],
            ..Entity::default()
        }
    }

    #[tokio::test]
    async fn test_round_trip_is_field_for_field() {
        let (cache, _store) = cache_with_store();
        let entity = sample_entity("X");

        cache.put(&entity).await.unwrap();
        let cached = cache.get("X").await.unwrap().expect("record should exist");
        assert_eq!(cached.into_entity(), entity);
    }

    #[tokio::test]
    async fn test_key_is_namespaced() {
        let (cache, store) = cache_with_store();
        cache.put(&sample_entity("abc")).await.unwrap();
        assert!(store.get("product_cache:abc").await.unwrap().is_some());
        assert_eq!(cache.key_for("abc"), "product_cache:abc");
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let (cache, _store) = cache_with_store();
        let mut entity = sample_entity("X");
        cache.put(&entity).await.unwrap();
        entity.price = 10.0;
        cache.put(&entity).await.unwrap();

        let cached = cache.get("X").await.unwrap().unwrap();
        assert_eq!(cached.entity().price, 10.0);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_a_miss() {
        let (cache, store) = cache_with_store();
        store.insert_raw("product_cache:X", "{not json").unwrap();

        assert!(cache.get("X").await.unwrap().is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn test_mismatched_record_is_a_miss() {
        let (cache, store) = cache_with_store();
        let record = CacheRecord::new(sample_entity("other"), Utc::now());
        store
            .insert_raw("product_cache:X", serde_json::to_string(&record).unwrap())
            .unwrap();

        assert!(cache.get("X").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_track_hits_misses_writes() {
        let (cache, _store) = cache_with_store();
        assert!(cache.get("X").await.unwrap().is_none());
        cache.put(&sample_entity("X")).await.unwrap();
        assert!(cache.get("X").await.unwrap().is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_round_trip_keeps_floats_exact(
            price in 0.0f64..1.0e9,
            discount_price in proptest::option::of(0.0f64..1.0e9),
            ratings_average in 0.0f64..=5.0,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let (cache, _store) = cache_with_store();
            let entity = Entity {
                price,
                discount_price,
                ratings_average,
                ..sample_entity("X")
            };

            let cached = runtime.block_on(async {
                cache.put(&entity).await.unwrap();
                cache.get("X").await.unwrap().unwrap()
            });
            prop_assert_eq!(cached.into_entity(), entity);
        }
    }
}
