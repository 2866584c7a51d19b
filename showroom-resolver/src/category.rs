//! Category resolution.
//!
//! Upstream category data is frequently missing or mislabeled (literal
//! placeholders such as `"Category 6da"`). Resolution order:
//!
//! 1. object with a real `name` is used as-is,
//! 2. a bare id, or an object carrying only an id, is looked up in the known
//!    category table,
//! 3. keyword rules over the entity name, first match wins,
//! 4. the generic Furniture category.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use showroom_core::{is_object_id, slugify, Category};

/// Known category ids and their display names.
pub const KNOWN_CATEGORIES: &[(&str, &str)] = &[
    ("680c9481ab11e96a288ef6d2", "Sofa Beds"),
    ("680c9484ab11e96a288ef6da", "Tables"),
    ("680c9486ab11e96a288ef6de", "Chairs"),
    ("680c9489ab11e96a288ef6e2", "Wardrobes"),
    ("680c948bab11e96a288ef6e6", "Beds"),
];

/// Keyword set mapped to a category name.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub category: &'static str,
}

/// Ordered keyword rules. Order matters: "sofa bed" must land in Sofa Beds.
pub const KEYWORD_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["sofa", "couch", "sectional", "futon"],
        category: "Sofa Beds",
    },
    KeywordRule {
        keywords: &["table", "desk"],
        category: "Tables",
    },
    KeywordRule {
        keywords: &["chair", "stool", "bench"],
        category: "Chairs",
    },
    KeywordRule {
        keywords: &["wardrobe", "cabinet", "storage", "closet", "dresser"],
        category: "Wardrobes",
    },
    KeywordRule {
        keywords: &["bed", "mattress", "bunk"],
        category: "Beds",
    },
];

static PLACEHOLDER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(category(\s+[0-9a-f]+)?|uncategori[sz]ed|undefined|null|unknown|n/?a)?\s*$")
        .expect("Invalid placeholder regex")
});

/// True for empty names and literal placeholders like `"Category 6da"`.
pub fn is_placeholder_name(name: &str) -> bool {
    PLACEHOLDER_NAME.is_match(name)
}

/// Raw category reference as it arrives in a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCategory {
    Absent,
    Id(String),
    Object {
        id: Option<String>,
        name: Option<String>,
        slug: Option<String>,
    },
}

impl RawCategory {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) if !s.trim().is_empty() => Self::Id(s.trim().to_string()),
            Some(Value::Object(map)) => {
                let text = |key: &str| {
                    map.get(key)
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                };
                let id = text("_id").or_else(|| text("id"));
                let name = text("name");
                let slug = text("slug");
                if id.is_none() && name.is_none() && slug.is_none() {
                    Self::Absent
                } else {
                    Self::Object { id, name, slug }
                }
            }
            _ => Self::Absent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryResolver {
    by_id: HashMap<String, Category>,
    rules: Vec<KeywordRule>,
}

impl Default for CategoryResolver {
    fn default() -> Self {
        Self::new(KNOWN_CATEGORIES, KEYWORD_RULES)
    }
}

impl CategoryResolver {
    pub fn new(known: &[(&str, &str)], rules: &[KeywordRule]) -> Self {
        let by_id = known
            .iter()
            .map(|(id, name)| (id.to_string(), Category::new(*id, *name)))
            .collect();
        Self {
            by_id,
            rules: rules.to_vec(),
        }
    }

    /// Resolve a raw category reference into a canonical category.
    pub fn resolve(&self, raw: &RawCategory, entity_name: &str) -> Category {
        match raw {
            RawCategory::Object {
                id,
                name: Some(name),
                slug,
            } if !is_placeholder_name(name) => {
                let id = id
                    .clone()
                    .or_else(|| self.id_for_name(name))
                    .unwrap_or_else(|| slugify(name));
                return Category::with_slug(id, name.as_str(), slug.as_deref());
            }
            RawCategory::Object { id: Some(id), .. } => {
                if let Some(category) = self.lookup_id(id) {
                    return category;
                }
            }
            RawCategory::Id(value) => {
                if let Some(category) = self.lookup_id(value) {
                    return category;
                }
                if !is_object_id(value) && !is_placeholder_name(value) {
                    let id = self.id_for_name(value).unwrap_or_else(|| slugify(value));
                    return Category::new(id, value.as_str());
                }
            }
            _ => {}
        }

        self.infer_from_text(entity_name)
            .unwrap_or_else(Category::furniture)
    }

    pub fn lookup_id(&self, id: &str) -> Option<Category> {
        self.by_id.get(id).cloned()
    }

    /// Keyword pass over arbitrary text (entity name or raw id).
    ///
    /// Keywords match whole words only, so "comfortable" is not a table.
    pub fn infer_from_text(&self, text: &str) -> Option<Category> {
        let text = text.to_lowercase();
        let words: Vec<&str> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        self.rules
            .iter()
            .find(|rule| {
                rule.keywords
                    .iter()
                    .any(|kw| words.iter().any(|word| is_keyword_form(word, kw)))
            })
            .map(|rule| {
                let id = self
                    .id_for_name(rule.category)
                    .unwrap_or_else(|| format!("inferred-{}", slugify(rule.category)));
                Category::new(id, rule.category)
            })
    }

    fn id_for_name(&self, name: &str) -> Option<String> {
        self.by_id
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.id.clone())
    }
}

/// `word` is `keyword` or its `-s`/`-es` plural.
fn is_keyword_form(word: &str, keyword: &str) -> bool {
    word == keyword
        || word.strip_suffix('s') == Some(keyword)
        || word.strip_suffix("es") == Some(keyword)
}
