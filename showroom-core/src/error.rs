//! Error types for showroom operations

use thiserror::Error;

/// Errors from a single HTTP fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request to {url} timed out after {after_ms}ms")]
    Timeout { url: String, after_ms: u64 },

    #[error("Network failure for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed JSON from {url}: {reason}")]
    MalformedJson { url: String, reason: String },
}

impl FetchError {
    /// Only network-level failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::Network { url, .. }
            | Self::Status { url, .. }
            | Self::MalformedJson { url, .. } => url,
        }
    }
}

/// Persistent key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store I/O error: {reason}")]
    Io { reason: String },

    #[error("Transaction failed: {reason}")]
    Transaction { reason: String },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            reason: e.to_string(),
        }
    }
}

/// A source produced nothing usable. Swallowed by the orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No entity object recognized in payload from {source_label}")]
    Unrecognized { source_label: String },
}

/// Candidate validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Entity id must not be empty")]
    EmptyId,

    #[error("Candidate id {found} does not match requested id {requested}")]
    IdMismatch { requested: String, found: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for all showroom errors.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Resolution failed for {id}: {reason}")]
    Exhausted { id: String, reason: String },
}

impl From<FetchError> for ResolveError {
    fn from(e: FetchError) -> Self {
        Self::Source(SourceError::Fetch(e))
    }
}

impl From<StoreError> for ResolveError {
    fn from(e: StoreError) -> Self {
        Self::Source(SourceError::Store(e))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_retryable_only_for_network_level() {
        let timeout = FetchError::Timeout {
            url: "http://x/api/products/1".to_string(),
            after_ms: 10_000,
        };
        let network = FetchError::Network {
            url: "http://x".to_string(),
            reason: "connection refused".to_string(),
        };
        let status = FetchError::Status {
            url: "http://x".to_string(),
            status: 404,
        };
        let malformed = FetchError::MalformedJson {
            url: "http://x".to_string(),
            reason: "expected value".to_string(),
        };
        assert!(timeout.is_retryable());
        assert!(network.is_retryable());
        assert!(!status.is_retryable());
        assert!(!malformed.is_retryable());
    }

    #[test]
    fn test_fetch_error_display_status() {
        let err = FetchError::Status {
            url: "http://x/api/products/1".to_string(),
            status: 503,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("503"));
        assert!(msg.contains("/api/products/1"));
        assert_eq!(err.url(), "http://x/api/products/1");
    }

    #[test]
    fn test_validation_error_display_mismatch() {
        let err = ValidationError::IdMismatch {
            requested: "abc".to_string(),
            found: "xyz".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("abc"));
        assert!(msg.contains("xyz"));
    }

    #[test]
    fn test_resolve_error_from_variants() {
        let fetch = ResolveError::from(FetchError::Network {
            url: "u".to_string(),
            reason: "r".to_string(),
        });
        assert!(matches!(fetch, ResolveError::Source(SourceError::Fetch(_))));

        let store = ResolveError::from(StoreError::LockPoisoned);
        assert!(matches!(store, ResolveError::Source(SourceError::Store(_))));

        let validation = ResolveError::from(ValidationError::EmptyId);
        assert!(matches!(validation, ResolveError::Validation(_)));

        let config = ResolveError::from(ConfigError::InvalidValue {
            field: "deployed_base_url".to_string(),
            reason: "must not be empty".to_string(),
        });
        assert!(matches!(config, ResolveError::Config(_)));
    }

    #[test]
    fn test_store_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StoreError::from(io);
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(format!("{}", err).contains("denied"));
    }
}
