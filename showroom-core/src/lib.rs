//! Showroom Core - Entity Types
//!
//! Canonical product records, error taxonomy and resolver configuration.
//! Every other showroom crate depends on this one; it holds no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;

pub use config::{EndpointFamily, EndpointPolicy, ResolverConfig};
pub use error::{
    ConfigError, FetchError, ResolveError, SourceError, StoreError,
    ValidationError,
};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Opaque entity identifier (typically 24 lowercase hex characters).
pub type EntityId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Returns true when `id` looks like a backend object id (hex, at least 12 chars).
pub fn is_object_id(id: &str) -> bool {
    id.len() >= 12 && id.chars().all(|c| c.is_ascii_hexdigit())
}

// ============================================================================
// CATEGORY
// ============================================================================

/// Canonical product category.
///
/// `slug` is always derivable from `name`; constructors fill it in when the
/// upstream record did not carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl Category {
    /// Build a category, deriving the slug from the name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id: id.into(),
            name,
            slug,
        }
    }

    /// Build a category with an explicit slug, falling back to the derived
    /// one when `slug` is blank.
    pub fn with_slug(id: impl Into<String>, name: impl Into<String>, slug: Option<&str>) -> Self {
        let mut category = Self::new(id, name);
        if let Some(slug) = slug.map(str::trim).filter(|s| !s.is_empty()) {
            category.slug = slug.to_string();
        }
        category
    }

    /// Placeholder used by `Entity::default()` before category resolution runs.
    pub fn uncategorized() -> Self {
        Self::new("uncategorized", "Uncategorized")
    }

    /// Terminal fallback of category inference.
    pub fn furniture() -> Self {
        Self::new("inferred-category", "Furniture")
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::uncategorized()
    }
}

/// Lowercase the name and join whitespace-separated words with hyphens.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// ============================================================================
// ENTITY
// ============================================================================

/// A single `{name, value}` specification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    pub value: String,
}

impl Specification {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The resolved product.
///
/// Every field carries a default so an `Entity` is never partially built:
/// normalization either yields a complete record or rejects the candidate.
/// `discount_price` is preserved as received; nothing checks it against
/// `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub ratings_average: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub specifications: Vec<Specification>,
    /// Review records are passed through untouched.
    #[serde(default)]
    pub reviews: Vec<serde_json::Value>,
}

impl Entity {
    /// An entity with the given id and every other field defaulted.
    pub fn with_id(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            price: 0.0,
            discount_price: None,
            stock: 0,
            images: Vec::new(),
            category: Category::uncategorized(),
            ratings_average: 0.0,
            review_count: 0,
            specifications: Vec::new(),
            reviews: Vec::new(),
        }
    }
}

// ============================================================================
// CACHE RECORD
// ============================================================================

/// Persisted form of a resolved entity, keyed by entity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub id: EntityId,
    pub entity: Entity,
    pub cached_at: Timestamp,
}

impl CacheRecord {
    pub fn new(entity: Entity, cached_at: Timestamp) -> Self {
        Self {
            id: entity.id.clone(),
            entity,
            cached_at,
        }
    }
}

// ============================================================================
// RESOLUTION ATTEMPT
// ============================================================================

/// Diagnostic trace of one source attempt. Never part of the entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionAttempt {
    pub source_label: String,
    pub raw_payload: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl ResolutionAttempt {
    pub fn succeeded(source_label: impl Into<String>, raw_payload: Option<serde_json::Value>) -> Self {
        Self {
            source_label: source_label.into(),
            raw_payload,
            error: None,
        }
    }

    pub fn failed(
        source_label: impl Into<String>,
        raw_payload: Option<serde_json::Value>,
        error: impl ToString,
    ) -> Self {
        Self {
            source_label: source_label.into(),
            raw_payload,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Sofa Beds"), "sofa-beds");
        assert_eq!(slugify("  Dining   Tables "), "dining-tables");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_category_with_slug_prefers_supplied_slug() {
        let category = Category::with_slug("c1", "Chairs", Some("seating"));
        assert_eq!(category.slug, "seating");

        let derived = Category::with_slug("c1", "Office Chairs", Some("  "));
        assert_eq!(derived.slug, "office-chairs");
    }

    #[test]
    fn test_default_entity_is_fully_populated() {
        let entity = Entity::with_id("p1");
        assert_eq!(entity.id, "p1");
        assert!(entity.images.is_empty());
        assert!(entity.reviews.is_empty());
        assert_eq!(entity.stock, 0);
        assert_eq!(entity.category, Category::uncategorized());
        assert!(entity.discount_price.is_none());
    }

    #[test]
    fn test_entity_serializes_camel_case() {
        let mut entity = Entity::with_id("p1");
        entity.discount_price = Some(5.0);
        let json = serde_json::to_value(&entity).unwrap();
        assert!(json.get("discountPrice").is_some());
        assert!(json.get("ratingsAverage").is_some());
        assert!(json.get("reviewCount").is_some());
    }

    #[test]
    fn test_is_object_id() {
        assert!(is_object_id("680c9484ab11e96a288ef6da"));
        assert!(!is_object_id("unknown-chair-42"));
        assert!(!is_object_id("abc"));
    }

    proptest! {
        #[test]
        fn prop_slug_has_no_whitespace_or_uppercase(name in "[A-Za-z ]{0,40}") {
            let slug = slugify(&name);
            prop_assert!(!slug.contains(char::is_whitespace));
            prop_assert_eq!(slug.to_lowercase(), slug.clone());
        }

        #[test]
        fn prop_cache_record_keeps_entity_id(id in "[a-f0-9]{24}") {
            let record = CacheRecord::new(Entity::with_id(id.clone()), Utc::now());
            prop_assert_eq!(record.id, id);
        }
    }
}
