//! Placeholder entities built from nothing but the requested id.

use async_trait::async_trait;
use showroom_core::config::DEFAULT_PLACEHOLDER_IMAGE_BASE;
use showroom_core::{is_object_id, Category, Entity, SourceError};

use crate::category::CategoryResolver;
use crate::sources::{Candidate, SourceAdapter, SourceKind};

const SYNTHETIC_DESCRIPTION: &str =
    "Full details for this product are temporarily unavailable. Please check back shortly.";

/// Deterministic: the same id always yields the same entity.
#[derive(Debug, Clone)]
pub struct SyntheticFallbackBuilder {
    categories: CategoryResolver,
    image_base: String,
}

impl Default for SyntheticFallbackBuilder {
    fn default() -> Self {
        Self::new(CategoryResolver::default(), DEFAULT_PLACEHOLDER_IMAGE_BASE)
    }
}

impl SyntheticFallbackBuilder {
    pub fn new(categories: CategoryResolver, image_base: impl Into<String>) -> Self {
        Self {
            categories,
            image_base: image_base.into(),
        }
    }

    pub fn build(&self, id: &str) -> Entity {
        // Hex ids can spell keywords ("bed"), so only slugs are inferred from.
        let category = if is_object_id(id) {
            Category::furniture()
        } else {
            self.categories
                .infer_from_text(id)
                .unwrap_or_else(Category::furniture)
        };

        Entity {
            id: id.to_string(),
            name: display_name(id),
            description: SYNTHETIC_DESCRIPTION.to_string(),
            images: vec![self.placeholder_image(id)],
            category,
            ..Entity::default()
        }
    }

    pub fn placeholder_image(&self, id: &str) -> String {
        format!("{}{}", self.image_base, urlencoding::encode(id))
    }
}

/// `"unknown-chair-42"` becomes `"Unknown Chair 42"`; object ids become
/// `"Product 680c94"`.
fn display_name(id: &str) -> String {
    if is_object_id(id) {
        return format!("Product {}", &id[..6]);
    }
    let words: Vec<String> = id
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();
    if words.is_empty() {
        "Product".to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Terminal source wrapping the builder. Never comes back empty.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    builder: SyntheticFallbackBuilder,
}

impl SyntheticSource {
    pub const LABEL: &'static str = "synthetic";

    pub fn new(builder: SyntheticFallbackBuilder) -> Self {
        Self { builder }
    }
}

#[async_trait]
impl SourceAdapter for SyntheticSource {
    fn label(&self) -> &str {
        Self::LABEL
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }

    async fn fetch(&self, id: &str) -> Result<Option<Candidate>, SourceError> {
        Ok(Some(Candidate::Entity(self.builder.build(id))))
    }
}
