//! Source adapters.
//!
//! A source is one way of obtaining candidate data for an id. The
//! orchestrator walks sources in registry order and stops at the first
//! candidate that normalizes and validates.

mod cache;
mod http;
mod preloaded;
mod static_table;

pub use cache::CacheSource;
pub use http::{HttpSource, UrlTemplate};
pub use preloaded::PreloadedSource;
pub use static_table::{seed_entities, StaticTableSource};

use async_trait::async_trait;
use serde_json::Value;
use showroom_core::{Entity, SourceError};

/// What a source is, as far as caching and degradation are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// One-shot injected payload from a prior render pass.
    Preloaded,
    /// Cache read ahead of the network in skip-network mode.
    CacheInstant,
    /// Live HTTP endpoint.
    Network,
    /// Cache read after every live source failed.
    CacheFallback,
    StaticTable,
    Synthetic,
}

impl SourceKind {
    /// Whether a winning candidate of this kind is written back to the cache.
    pub fn persists(&self) -> bool {
        !matches!(
            self,
            Self::CacheInstant | Self::CacheFallback | Self::Synthetic
        )
    }

    /// User-facing reason when a win from this kind counts as degraded.
    pub fn degraded_reason(&self) -> Option<&'static str> {
        match self {
            Self::CacheFallback => {
                Some("Live product data is unavailable; showing the last saved copy")
            }
            Self::StaticTable => {
                Some("Live product data is unavailable; showing stored catalogue data")
            }
            Self::Synthetic => {
                Some("Product details could not be loaded; showing placeholder information")
            }
            Self::Preloaded | Self::CacheInstant | Self::Network => None,
        }
    }
}

/// How strictly a candidate's id must match the requested id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdMatch {
    #[default]
    Exact,
    /// Either id may contain the other. Environments disagree on id prefixes.
    Fuzzy,
}

impl IdMatch {
    pub fn accepts(&self, requested: &str, found: &str) -> bool {
        if requested.is_empty() || found.is_empty() {
            return false;
        }
        match self {
            Self::Exact => requested == found,
            Self::Fuzzy => found.contains(requested) || requested.contains(found),
        }
    }
}

/// Data produced by a source.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    /// Unnormalized payload, still wrapped in whatever envelope it came in.
    Raw(Value),
    /// Already canonical (cache, static table, synthetic).
    Entity(Entity),
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable label reported to the caller on success.
    fn label(&self) -> &str;

    fn kind(&self) -> SourceKind;

    fn id_match(&self) -> IdMatch {
        IdMatch::Exact
    }

    /// `Ok(None)` means the source had nothing for this id.
    async fn fetch(&self, id: &str) -> Result<Option<Candidate>, SourceError>;
}
