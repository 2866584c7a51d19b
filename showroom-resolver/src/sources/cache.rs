use std::sync::Arc;

use async_trait::async_trait;
use showroom_core::SourceError;
use showroom_storage::LocalCache;

use super::{Candidate, SourceAdapter, SourceKind};

/// Reads the local cache, either ahead of the network or after it.
pub struct CacheSource {
    cache: Arc<LocalCache>,
    kind: SourceKind,
}

impl CacheSource {
    /// Cache read served before any network source.
    pub fn instant(cache: Arc<LocalCache>) -> Self {
        Self {
            cache,
            kind: SourceKind::CacheInstant,
        }
    }

    /// Cache read after every live source failed.
    pub fn fallback(cache: Arc<LocalCache>) -> Self {
        Self {
            cache,
            kind: SourceKind::CacheFallback,
        }
    }
}

#[async_trait]
impl SourceAdapter for CacheSource {
    fn label(&self) -> &str {
        match self.kind {
            SourceKind::CacheInstant => "cache-instant",
            _ => "cache",
        }
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, id: &str) -> Result<Option<Candidate>, SourceError> {
        let Some(cached) = self.cache.get(id).await? else {
            return Ok(None);
        };
        tracing::debug!(
            entity_id = %id,
            staleness_secs = cached.staleness().as_secs(),
            "Cache hit"
        );
        Ok(Some(Candidate::Entity(cached.into_entity())))
    }
}
