//! Showroom CLI
//!
//! Resolves one product id with the full fallback pipeline and prints the
//! entity as JSON.

pub mod args;
pub mod config;
pub mod error;
pub mod telemetry;

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use showroom_core::{Entity, ResolveError};
use showroom_resolver::{
    HttpTransport, PreloadedSource, ResolutionOrchestrator, ResolutionOutcome, ResolutionSink,
};
use showroom_storage::{InMemoryStore, KeyValueStore, LmdbStore, LocalCache};

use crate::args::CliArgs;
use crate::config::CliConfig;
use crate::error::CliError;

/// Reports callbacks on stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ResolutionSink for ConsoleSink {
    fn on_resolved(&self, entity: &Entity, source_label: &str) {
        tracing::info!(entity_id = %entity.id, source = %source_label, "Product resolved");
    }

    fn on_degraded(&self, reason: &str) {
        eprintln!("warning: {}", reason);
    }

    fn on_failed(&self, reason: &str) {
        eprintln!("error: {}", reason);
    }
}

/// Read a preloaded payload from a JSON file.
pub fn load_preloaded(path: &Path) -> Result<PreloadedSource, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&contents)?;
    Ok(PreloadedSource::raw(payload))
}

pub fn open_cache(config: &CliConfig) -> Result<Arc<LocalCache>, CliError> {
    let store: Arc<dyn KeyValueStore> = match &config.cache_path {
        Some(path) => Arc::new(LmdbStore::open(path, config.cache_max_size_mb)?),
        None => Arc::new(InMemoryStore::new()),
    };
    Ok(Arc::new(LocalCache::new(
        store,
        config.resolver.cache_namespace.clone(),
    )))
}

/// Resolve `args.id` and return the delivered entity.
pub async fn run(
    args: &CliArgs,
    config: &CliConfig,
    transport: Arc<dyn HttpTransport>,
    sink: &dyn ResolutionSink,
) -> Result<Entity, CliError> {
    let mut resolver_config = config.resolver.clone();
    resolver_config.skip_network |= args.skip_network;

    let cache = open_cache(config)?;
    let preloaded = args.preloaded.as_deref().map(load_preloaded).transpose()?;
    let orchestrator =
        ResolutionOrchestrator::from_config(&resolver_config, transport, Some(cache.clone()), preloaded)?;

    let outcome = orchestrator
        .resolve(&args.id, sink)
        .await
        .ok_or_else(|| CliError::Usage("product id must not be empty".to_string()))?;

    let stats = cache.stats();
    tracing::debug!(
        hits = stats.hits,
        misses = stats.misses,
        writes = stats.writes,
        "Cache stats"
    );

    match outcome {
        ResolutionOutcome::Resolved {
            entity, attempts, ..
        } => {
            tracing::debug!(attempts = attempts.len(), "Resolution finished");
            Ok(entity)
        }
        ResolutionOutcome::Failed { reason, .. } => Err(ResolveError::Exhausted {
            id: args.id.clone(),
            reason,
        }
        .into()),
        ResolutionOutcome::Cancelled => Err(ResolveError::Exhausted {
            id: args.id.clone(),
            reason: "resolution was superseded".to_string(),
        }
        .into()),
    }
}
