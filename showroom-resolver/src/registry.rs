//! Ordered source list.
//!
//! Order is a correctness property: fresher and cheaper sources come first,
//! and degraded ones only after every live endpoint has been exhausted.

use std::sync::Arc;

use showroom_core::{EndpointFamily, ResolverConfig};
use showroom_storage::LocalCache;

use crate::category::CategoryResolver;
use crate::fetcher::{HttpTransport, RetryingFetcher};
use crate::sources::{
    CacheSource, HttpSource, IdMatch, PreloadedSource, SourceAdapter, StaticTableSource,
    UrlTemplate,
};
use crate::synthetic::{SyntheticFallbackBuilder, SyntheticSource};

pub const DIRECT_PATH: &str = "/api/direct-product/";
pub const RELIABLE_PATH: &str = "/api/reliable/products/";
pub const LEGACY_PATH: &str = "/api/products/";
pub const DEBUG_PATH: &str = "/api/debug/product/";
pub const DEBUG_ALT_PATH: &str = "/api/debug-product/";

#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { sources }
    }

    pub fn push(&mut self, source: Arc<dyn SourceAdapter>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.sources
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Build the production source list.
    ///
    /// preloaded, instant cache (skip-network mode only), direct, reliable,
    /// legacy and debug endpoints (local before deployed), the extended
    /// timeout last-resort endpoint, fallback cache (unless already tried),
    /// static table, synthetic.
    pub fn from_config(
        config: &ResolverConfig,
        transport: Arc<dyn HttpTransport>,
        cache: Option<Arc<LocalCache>>,
        preloaded: Option<PreloadedSource>,
        categories: CategoryResolver,
    ) -> Self {
        let fetcher = RetryingFetcher::new(transport);
        let mut registry = Self::default();

        if let Some(preloaded) = preloaded {
            registry.push(Arc::new(preloaded));
        }

        if config.skip_network {
            if let Some(cache) = &cache {
                registry.push(Arc::new(CacheSource::instant(cache.clone())));
            }
        }

        let endpoint_families = [
            (EndpointFamily::Direct, DIRECT_PATH, IdMatch::Exact),
            (EndpointFamily::Reliable, RELIABLE_PATH, IdMatch::Fuzzy),
            (EndpointFamily::Legacy, LEGACY_PATH, IdMatch::Exact),
            (EndpointFamily::Debug, DEBUG_PATH, IdMatch::Fuzzy),
        ];
        let environments = config.environments();

        for (family, path, id_match) in endpoint_families {
            for (env, base) in &environments {
                registry.push(Arc::new(
                    HttpSource::new(
                        format!("{}-{}", family.as_str(), env),
                        UrlTemplate::new(*base, path),
                        config.policy(family),
                        fetcher.clone(),
                    )
                    .with_id_match(id_match),
                ));
            }
            if family == EndpointFamily::Debug {
                registry.push(Arc::new(
                    HttpSource::new(
                        "debug-alt-deployed",
                        UrlTemplate::new(config.deployed_base(), DEBUG_ALT_PATH),
                        config.policy(family),
                        fetcher.clone(),
                    )
                    .with_id_match(id_match),
                ));
            }
        }

        registry.push(Arc::new(HttpSource::new(
            "last-resort-deployed",
            UrlTemplate::new(config.deployed_base(), DIRECT_PATH),
            config.policy(EndpointFamily::LastResort),
            fetcher,
        )));

        if !config.skip_network {
            if let Some(cache) = &cache {
                registry.push(Arc::new(CacheSource::fallback(cache.clone())));
            }
        }

        registry.push(Arc::new(StaticTableSource::seeded()));
        registry.push(Arc::new(SyntheticSource::new(SyntheticFallbackBuilder::new(
            categories,
            config.placeholder_image_base.clone(),
        ))));

        registry
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.labels())
            .finish()
    }
}
