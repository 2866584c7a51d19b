//! Showroom Resolver
//!
//! Resolves one product id against an ordered list of unreliable sources
//! and always hands the caller a complete [`Entity`](showroom_core::Entity):
//! live endpoints first, then the local cache, the static catalogue and
//! finally a synthetic placeholder.
//!
//! ```text
//! id ──► SourceRegistry ──► candidate ──► EntityNormalizer ──► validate
//!                                              │
//!                                      CategoryResolver
//!                                              │
//!                             LocalCache::put ◄┴► ResolutionSink (once)
//! ```

pub mod category;
pub mod fetcher;
pub mod normalizer;
pub mod orchestrator;
pub mod registry;
pub mod sources;
pub mod synthetic;

pub use category::{CategoryResolver, KeywordRule, RawCategory, KEYWORD_RULES, KNOWN_CATEGORIES};
pub use fetcher::{HttpTransport, RawResponse, ReqwestTransport, RetryingFetcher};
pub use normalizer::{decode_envelope, EntityNormalizer, RawEntity};
pub use orchestrator::{
    validate_candidate, NullSink, ResolutionOrchestrator, ResolutionOutcome, ResolutionSink,
    ResolutionToken,
};
pub use registry::SourceRegistry;
pub use sources::{
    CacheSource, Candidate, HttpSource, IdMatch, PreloadedSource, SourceAdapter, SourceKind,
    StaticTableSource, UrlTemplate,
};
pub use synthetic::{SyntheticFallbackBuilder, SyntheticSource};
