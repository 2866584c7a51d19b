//! Resolution orchestrator.
//!
//! Walks the source registry strictly in order, one source at a time, and
//! delivers exactly one terminal callback per current resolution. Every
//! `begin` bumps a shared generation; a token from an older generation is
//! stale and its resolution is dropped at the next source boundary without
//! writing the cache or calling the sink.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use showroom_core::{
    ConfigError, Entity, ResolutionAttempt, ResolveError, ResolverConfig, SourceError,
    ValidationError,
};
use showroom_storage::LocalCache;
use tracing::Instrument;

use crate::category::CategoryResolver;
use crate::fetcher::HttpTransport;
use crate::normalizer::EntityNormalizer;
use crate::registry::SourceRegistry;
use crate::sources::{Candidate, IdMatch, PreloadedSource, SourceAdapter};

/// Receives the terminal outcome of a resolution.
pub trait ResolutionSink: Send + Sync {
    fn on_resolved(&self, entity: &Entity, source_label: &str);

    /// Fired after `on_resolved` when the winner was a degraded source.
    fn on_degraded(&self, reason: &str);

    fn on_failed(&self, reason: &str);
}

/// Sink that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ResolutionSink for NullSink {
    fn on_resolved(&self, _entity: &Entity, _source_label: &str) {}
    fn on_degraded(&self, _reason: &str) {}
    fn on_failed(&self, _reason: &str) {}
}

/// Identifies one logical resolution. Stale once a newer `begin` happens.
#[derive(Debug, Clone)]
pub struct ResolutionToken {
    id: String,
    generation: u64,
    current: Arc<AtomicU64>,
}

impl ResolutionToken {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

/// What a resolution ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Resolved {
        entity: Entity,
        source_label: String,
        /// Reason passed to `on_degraded`, if the winner was degraded.
        degraded: Option<String>,
        attempts: Vec<ResolutionAttempt>,
    },
    Failed {
        reason: String,
        attempts: Vec<ResolutionAttempt>,
    },
    /// Superseded by a newer resolution. No callback was delivered.
    Cancelled,
}

impl ResolutionOutcome {
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            Self::Resolved { entity, .. } => Some(entity),
            _ => None,
        }
    }

    pub fn source_label(&self) -> Option<&str> {
        match self {
            Self::Resolved { source_label, .. } => Some(source_label),
            _ => None,
        }
    }

    pub fn attempts(&self) -> &[ResolutionAttempt] {
        match self {
            Self::Resolved { attempts, .. } | Self::Failed { attempts, .. } => attempts,
            Self::Cancelled => &[],
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Resolved { degraded: Some(_), .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub struct ResolutionOrchestrator {
    registry: SourceRegistry,
    normalizer: EntityNormalizer,
    cache: Option<Arc<LocalCache>>,
    generation: Arc<AtomicU64>,
}

impl ResolutionOrchestrator {
    pub fn new(
        registry: SourceRegistry,
        normalizer: EntityNormalizer,
        cache: Option<Arc<LocalCache>>,
    ) -> Self {
        Self {
            registry,
            normalizer,
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Validate `config` and wire up the production source list.
    pub fn from_config(
        config: &ResolverConfig,
        transport: Arc<dyn HttpTransport>,
        cache: Option<Arc<LocalCache>>,
        preloaded: Option<PreloadedSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let categories = CategoryResolver::default();
        let registry = SourceRegistry::from_config(
            config,
            transport,
            cache.clone(),
            preloaded,
            categories.clone(),
        );
        tracing::debug!(sources = ?registry.labels(), "Source registry built");
        Ok(Self::new(registry, EntityNormalizer::new(categories), cache))
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Start a resolution, superseding every earlier one.
    ///
    /// Returns `None` for an empty id; nothing is superseded in that case.
    pub fn begin(&self, id: &str) -> Option<ResolutionToken> {
        let id = id.trim();
        if id.is_empty() {
            tracing::warn!("Rejected resolution for empty id");
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Some(ResolutionToken {
            id: id.to_string(),
            generation,
            current: self.generation.clone(),
        })
    }

    /// `begin` followed by `run`. `None` when the id was rejected.
    pub async fn resolve(&self, id: &str, sink: &dyn ResolutionSink) -> Option<ResolutionOutcome> {
        let token = self.begin(id)?;
        Some(self.run(&token, sink).await)
    }

    /// Drive the pipeline for `token`.
    pub async fn run(&self, token: &ResolutionToken, sink: &dyn ResolutionSink) -> ResolutionOutcome {
        let span = tracing::info_span!("resolve", entity_id = %token.id(), generation = token.generation());
        self.run_inner(token, sink).instrument(span).await
    }

    async fn run_inner(&self, token: &ResolutionToken, sink: &dyn ResolutionSink) -> ResolutionOutcome {
        let id = token.id();
        let mut attempts = Vec::with_capacity(self.registry.len());

        for source in self.registry.sources() {
            if !token.is_current() {
                tracing::debug!("Resolution superseded");
                return ResolutionOutcome::Cancelled;
            }

            let label = source.label();
            tracing::debug!(source = %label, attempt = attempts.len() + 1, "Trying source");

            let (entity, raw_payload) = match self.try_source(source.as_ref(), id).await {
                Ok(Some(found)) => found,
                Ok(None) => {
                    attempts.push(ResolutionAttempt::failed(label, None, "no data"));
                    continue;
                }
                Err((e, raw_payload)) => {
                    tracing::warn!(source = %label, error = %e, "Source failed");
                    attempts.push(ResolutionAttempt::failed(label, raw_payload, e));
                    continue;
                }
            };

            if !token.is_current() {
                tracing::debug!(source = %label, "Resolution superseded before delivery");
                return ResolutionOutcome::Cancelled;
            }

            if source.kind().persists() {
                self.persist(&entity).await;
            }

            if !token.is_current() {
                tracing::debug!(source = %label, "Resolution superseded during cache write");
                return ResolutionOutcome::Cancelled;
            }

            attempts.push(ResolutionAttempt::succeeded(label, raw_payload));
            let degraded = source.kind().degraded_reason().map(str::to_string);

            sink.on_resolved(&entity, label);
            match &degraded {
                Some(reason) => {
                    tracing::info!(source = %label, reason = %reason, "Resolved with degraded source");
                    sink.on_degraded(reason);
                }
                None => tracing::info!(source = %label, "Resolved"),
            }

            return ResolutionOutcome::Resolved {
                entity,
                source_label: label.to_string(),
                degraded,
                attempts,
            };
        }

        if !token.is_current() {
            return ResolutionOutcome::Cancelled;
        }

        let reason = format!("No source could produce product {}", id);
        tracing::error!(attempts = attempts.len(), "{}", reason);
        sink.on_failed(&reason);
        ResolutionOutcome::Failed { reason, attempts }
    }

    /// Fetch, normalize and validate one source's candidate.
    ///
    /// Errors carry the raw payload when there was one, for diagnostics.
    async fn try_source(
        &self,
        source: &dyn SourceAdapter,
        id: &str,
    ) -> Result<Option<(Entity, Option<Value>)>, (ResolveError, Option<Value>)> {
        let candidate = match source.fetch(id).await {
            Ok(Some(candidate)) => candidate,
            Ok(None) => return Ok(None),
            Err(e) => return Err((e.into(), None)),
        };

        let (entity, raw_payload) = match candidate {
            Candidate::Entity(entity) => (entity, None),
            Candidate::Raw(value) => match self.normalizer.normalize(&value, id) {
                Some(entity) => (entity, Some(value)),
                None => {
                    let e = SourceError::Unrecognized {
                        source_label: source.label().to_string(),
                    };
                    return Err((e.into(), Some(value)));
                }
            },
        };

        match validate_candidate(entity, id, source.id_match()) {
            Ok(entity) => Ok(Some((entity, raw_payload))),
            Err(e) => Err((e.into(), raw_payload)),
        }
    }

    async fn persist(&self, entity: &Entity) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.put(entity).await {
            tracing::warn!(error = %e, "Failed to cache resolved entity");
        }
    }
}

/// Accept a candidate whose id correlates with the requested one.
///
/// Fuzzy matches are re-keyed to the requested id so the cache and the
/// caller agree on identity.
pub fn validate_candidate(
    mut entity: Entity,
    requested: &str,
    id_match: IdMatch,
) -> Result<Entity, ValidationError> {
    if entity.id.is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if !id_match.accepts(requested, &entity.id) {
        return Err(ValidationError::IdMismatch {
            requested: requested.to_string(),
            found: entity.id,
        });
    }
    if entity.id != requested {
        tracing::debug!(found = %entity.id, "Accepted fuzzy id match");
        entity.id = requested.to_string();
    }
    Ok(entity)
}
