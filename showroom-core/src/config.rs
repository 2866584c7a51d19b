//! Configuration types

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default key prefix for cached entity records.
pub const DEFAULT_CACHE_NAMESPACE: &str = "product_cache";

/// Default prefix for synthetic placeholder images.
pub const DEFAULT_PLACEHOLDER_IMAGE_BASE: &str = "https://via.placeholder.com/600x400?text=";

/// Endpoint families, in the order the registry tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointFamily {
    Direct,
    Reliable,
    Legacy,
    Debug,
    LastResort,
}

impl EndpointFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Reliable => "reliable",
            Self::Legacy => "legacy",
            Self::Debug => "debug",
            Self::LastResort => "last-resort",
        }
    }
}

/// Timeout and retry budget for one endpoint family.
///
/// Retries use a constant delay, not exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointPolicy {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl EndpointPolicy {
    pub const fn new(timeout_ms: u64, max_retries: u32, retry_delay_ms: u64) -> Self {
        Self {
            timeout_ms,
            max_retries,
            retry_delay_ms,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Total attempts including the first one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn default_for(family: EndpointFamily) -> Self {
        match family {
            EndpointFamily::Direct => Self::new(10_000, 2, 1_000),
            EndpointFamily::Reliable => Self::new(10_000, 1, 1_000),
            EndpointFamily::Legacy => Self::new(10_000, 1, 1_000),
            EndpointFamily::Debug => Self::new(10_000, 0, 1_000),
            EndpointFamily::LastResort => Self::new(60_000, 0, 1_000),
        }
    }
}

/// Per-family policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointPolicies {
    #[serde(default = "default_direct")]
    pub direct: EndpointPolicy,
    #[serde(default = "default_reliable")]
    pub reliable: EndpointPolicy,
    #[serde(default = "default_legacy")]
    pub legacy: EndpointPolicy,
    #[serde(default = "default_debug")]
    pub debug: EndpointPolicy,
    #[serde(default = "default_last_resort")]
    pub last_resort: EndpointPolicy,
}

fn default_direct() -> EndpointPolicy {
    EndpointPolicy::default_for(EndpointFamily::Direct)
}

fn default_reliable() -> EndpointPolicy {
    EndpointPolicy::default_for(EndpointFamily::Reliable)
}

fn default_legacy() -> EndpointPolicy {
    EndpointPolicy::default_for(EndpointFamily::Legacy)
}

fn default_debug() -> EndpointPolicy {
    EndpointPolicy::default_for(EndpointFamily::Debug)
}

fn default_last_resort() -> EndpointPolicy {
    EndpointPolicy::default_for(EndpointFamily::LastResort)
}

impl Default for EndpointPolicies {
    fn default() -> Self {
        Self {
            direct: default_direct(),
            reliable: default_reliable(),
            legacy: default_legacy(),
            debug: default_debug(),
            last_resort: default_last_resort(),
        }
    }
}

impl EndpointPolicies {
    pub fn get(&self, family: EndpointFamily) -> EndpointPolicy {
        match family {
            EndpointFamily::Direct => self.direct,
            EndpointFamily::Reliable => self.reliable,
            EndpointFamily::Legacy => self.legacy,
            EndpointFamily::Debug => self.debug,
            EndpointFamily::LastResort => self.last_resort,
        }
    }
}

/// Resolver configuration.
///
/// Only `deployed_base_url` is required; everything else has a documented
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Local development backend. Local endpoints are skipped when absent.
    #[serde(default)]
    pub local_base_url: Option<String>,
    pub deployed_base_url: String,
    /// Serve a cached record before touching the network.
    #[serde(default)]
    pub skip_network: bool,
    #[serde(default = "default_cache_namespace")]
    pub cache_namespace: String,
    #[serde(default = "default_placeholder_image_base")]
    pub placeholder_image_base: String,
    #[serde(default)]
    pub endpoints: EndpointPolicies,
}

fn default_cache_namespace() -> String {
    DEFAULT_CACHE_NAMESPACE.to_string()
}

fn default_placeholder_image_base() -> String {
    DEFAULT_PLACEHOLDER_IMAGE_BASE.to_string()
}

impl ResolverConfig {
    /// Build a configuration with the documented defaults.
    pub fn defaults(deployed_base_url: impl Into<String>) -> Self {
        Self {
            local_base_url: None,
            deployed_base_url: deployed_base_url.into(),
            skip_network: false,
            cache_namespace: default_cache_namespace(),
            placeholder_image_base: default_placeholder_image_base(),
            endpoints: EndpointPolicies::default(),
        }
    }

    pub fn with_local_base_url(mut self, url: impl Into<String>) -> Self {
        self.local_base_url = Some(url.into());
        self
    }

    pub fn with_skip_network(mut self, skip: bool) -> Self {
        self.skip_network = skip;
        self
    }

    pub fn with_policy(mut self, family: EndpointFamily, policy: EndpointPolicy) -> Self {
        match family {
            EndpointFamily::Direct => self.endpoints.direct = policy,
            EndpointFamily::Reliable => self.endpoints.reliable = policy,
            EndpointFamily::Legacy => self.endpoints.legacy = policy,
            EndpointFamily::Debug => self.endpoints.debug = policy,
            EndpointFamily::LastResort => self.endpoints.last_resort = policy,
        }
        self
    }

    /// Apply one policy to every family. Handy for tests with tiny budgets.
    pub fn with_uniform_policy(mut self, policy: EndpointPolicy) -> Self {
        self.endpoints = EndpointPolicies {
            direct: policy,
            reliable: policy,
            legacy: policy,
            debug: policy,
            last_resort: policy,
        };
        self
    }

    pub fn policy(&self, family: EndpointFamily) -> EndpointPolicy {
        self.endpoints.get(family)
    }

    /// `(environment, base url)` pairs in try order: local first, then
    /// deployed.
    pub fn environments(&self) -> Vec<(&'static str, &str)> {
        let mut envs = Vec::with_capacity(2);
        if let Some(local) = self.local_base_url.as_deref() {
            envs.push(("local", local.trim_end_matches('/')));
        }
        envs.push(("deployed", self.deployed_base()));
        envs
    }

    pub fn deployed_base(&self) -> &str {
        self.deployed_base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deployed_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "deployed_base_url".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !is_http_url(&self.deployed_base_url) {
            return Err(ConfigError::InvalidValue {
                field: "deployed_base_url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }
        if let Some(local) = &self.local_base_url {
            if !is_http_url(local) {
                return Err(ConfigError::InvalidValue {
                    field: "local_base_url".to_string(),
                    reason: "must start with http:// or https://".to_string(),
                });
            }
        }
        if self.cache_namespace.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cache_namespace".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.placeholder_image_base.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "placeholder_image_base".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        for family in [
            EndpointFamily::Direct,
            EndpointFamily::Reliable,
            EndpointFamily::Legacy,
            EndpointFamily::Debug,
            EndpointFamily::LastResort,
        ] {
            if self.policy(family).timeout_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("endpoints.{}.timeout_ms", family.as_str()),
                    reason: "must be > 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("http://") || url.starts_with("https://")
}
