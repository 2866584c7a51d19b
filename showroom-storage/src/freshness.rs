//! Cached entity wrapper carrying staleness metadata.
//!
//! Staleness is diagnostic only: records never expire, but callers and logs
//! can see how old the data they are serving is.

use chrono::{DateTime, Utc};
use showroom_core::{CacheRecord, Entity};
use std::time::Duration;

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntity {
    entity: Entity,
    cached_at: DateTime<Utc>,
}

impl CachedEntity {
    pub fn new(entity: Entity, cached_at: DateTime<Utc>) -> Self {
        Self { entity, cached_at }
    }

    /// Consume the wrapper and return the entity.
    pub fn into_entity(self) -> Entity {
        self.entity
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// How long ago the record was written.
    pub fn staleness(&self) -> Duration {
        let now = Utc::now();
        if now > self.cached_at {
            (now - self.cached_at).to_std().unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    /// Returns true if the record was written at or after `timestamp`.
    pub fn is_fresh_as_of(&self, timestamp: DateTime<Utc>) -> bool {
        self.cached_at >= timestamp
    }
}

impl From<CacheRecord> for CachedEntity {
    fn from(record: CacheRecord) -> Self {
        Self::new(record.entity, record.cached_at)
    }
}

impl AsRef<Entity> for CachedEntity {
    fn as_ref(&self) -> &Entity {
        &self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness() {
        let past = Utc::now() - chrono::Duration::seconds(5);
        let read = CachedEntity::new(Entity::with_id("p1"), past);

        let staleness = read.staleness();
        assert!(staleness >= Duration::from_secs(4));
        assert!(staleness <= Duration::from_secs(10));
    }

    #[test]
    fn test_future_timestamp_is_not_stale() {
        let future = Utc::now() + chrono::Duration::seconds(30);
        let read = CachedEntity::new(Entity::with_id("p1"), future);
        assert_eq!(read.staleness(), Duration::ZERO);
    }

    #[test]
    fn test_is_fresh_as_of() {
        let cached_at = Utc::now();
        let read = CachedEntity::new(Entity::with_id("p1"), cached_at);

        assert!(read.is_fresh_as_of(cached_at - chrono::Duration::seconds(10)));
        assert!(read.is_fresh_as_of(cached_at));
        assert!(!read.is_fresh_as_of(cached_at + chrono::Duration::seconds(10)));
    }

    #[test]
    fn test_from_record() {
        let cached_at = Utc::now();
        let record = CacheRecord::new(Entity::with_id("p1"), cached_at);
        let read = CachedEntity::from(record);
        assert_eq!(read.entity().id, "p1");
        assert_eq!(read.cached_at(), cached_at);
    }
}
