//! Response normalization.
//!
//! Backends answer with several envelope shapes. Each known shape has one
//! decoder; decoders are tried in a fixed order and the first one that finds
//! an entity object wins. Field extraction afterwards is independent per
//! field: a bad `images` value does not cost us a good `price`.

use serde_json::{Map, Value};
use showroom_core::{Entity, Specification};

use crate::category::{CategoryResolver, RawCategory};

type Object = Map<String, Value>;

/// Identifier fields, in preference order.
const ID_FIELDS: &[&str] = &["_id", "id", "productId"];

/// An entity object located inside a payload, with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntity<'a> {
    pub id: String,
    pub fields: &'a Object,
    /// Name of the envelope decoder that matched.
    pub envelope: &'static str,
}

type EnvelopeDecoder = for<'a> fn(&'a Value, &str) -> Option<&'a Object>;

/// Known envelopes, most specific first.
const ENVELOPES: &[(&str, EnvelopeDecoder)] = &[
    ("success-data", decode_success_envelope),
    ("debug", decode_debug_envelope),
    ("data", decode_data_envelope),
    ("data-array", decode_data_array_envelope),
    ("array", decode_bare_array),
    ("bare", decode_bare_entity),
];

/// `{success: true, data: {...}}`
fn decode_success_envelope<'a>(raw: &'a Value, _requested_id: &str) -> Option<&'a Object> {
    if raw.get("success")?.as_bool()? {
        as_entity_object(raw.get("data")?)
    } else {
        None
    }
}

/// `{data: {...}, formats: ...}` as served by the debug endpoints.
fn decode_debug_envelope<'a>(raw: &'a Value, _requested_id: &str) -> Option<&'a Object> {
    raw.get("formats")?;
    as_entity_object(raw.get("data")?)
}

/// `{data: {...}}`
fn decode_data_envelope<'a>(raw: &'a Value, _requested_id: &str) -> Option<&'a Object> {
    as_entity_object(raw.get("data")?)
}

/// `{data: [{...}, ...]}`
fn decode_data_array_envelope<'a>(raw: &'a Value, requested_id: &str) -> Option<&'a Object> {
    pick_from_array(raw.get("data")?.as_array()?, requested_id)
}

/// `[{...}, ...]`
fn decode_bare_array<'a>(raw: &'a Value, requested_id: &str) -> Option<&'a Object> {
    pick_from_array(raw.as_array()?, requested_id)
}

/// `{...}` with an identifier at top level.
fn decode_bare_entity<'a>(raw: &'a Value, _requested_id: &str) -> Option<&'a Object> {
    as_entity_object(raw)
}

fn as_entity_object(value: &Value) -> Option<&Object> {
    let object = value.as_object()?;
    extract_id(object).map(|_| object)
}

/// Prefer the element whose id matches the request, else the first entity.
fn pick_from_array<'a>(items: &'a [Value], requested_id: &str) -> Option<&'a Object> {
    let mut entities = items.iter().filter_map(as_entity_object);
    let first = entities.clone().next()?;
    Some(
        entities
            .find(|object| extract_id(object).as_deref() == Some(requested_id))
            .unwrap_or(first),
    )
}

fn extract_id(object: &Object) -> Option<String> {
    ID_FIELDS
        .iter()
        .filter_map(|field| object.get(*field))
        .find_map(id_text)
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(id_text),
        _ => None,
    }
}

/// Locate the entity object inside an arbitrary payload.
pub fn decode_envelope<'a>(raw: &'a Value, requested_id: &str) -> Option<RawEntity<'a>> {
    if raw.get("success").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    ENVELOPES.iter().find_map(|&(name, decode)| {
        let fields = decode(raw, requested_id)?;
        let id = extract_id(fields)?;
        Some(RawEntity {
            id,
            fields,
            envelope: name,
        })
    })
}

// ============================================================================
// FIELD EXTRACTION
// ============================================================================

/// First alias that holds a usable value; wrong-typed aliases are skipped.
fn first_usable<'a, T>(
    object: &'a Object,
    keys: &[&str],
    usable: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    keys.iter().filter_map(|k| object.get(*k)).find_map(usable)
}

fn text_field(object: &Object, keys: &[&str]) -> String {
    first_usable(object, keys, |v| {
        v.as_str().map(str::trim).filter(|s| !s.is_empty())
    })
    .map(str::to_string)
    .unwrap_or_default()
}

/// Numbers or numeric strings; NaN and negatives are rejected.
fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

fn number_field(object: &Object, keys: &[&str]) -> Option<f64> {
    first_usable(object, keys, number)
}

fn count_field(object: &Object, keys: &[&str]) -> Option<u32> {
    number_field(object, keys).map(|n| n.floor().min(u32::MAX as f64) as u32)
}

fn images(object: &Object) -> Vec<String> {
    if let Some(items) = object.get("images").and_then(Value::as_array) {
        return items
            .iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(url.trim()),
                Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::trim),
                _ => None,
            })
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();
    }
    match object.get("image").and_then(Value::as_str).map(str::trim) {
        Some(url) if !url.is_empty() => vec![url.to_string()],
        _ => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn specifications(object: &Object) -> Vec<Specification> {
    match object.get("specifications") {
        Some(Value::Array(rows)) => rows
            .iter()
            .filter_map(|row| {
                let name = row.get("name").and_then(Value::as_str)?;
                let value = row.get("value").and_then(scalar_text).unwrap_or_default();
                Some(Specification::new(name, value))
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(name, value)| scalar_text(value).map(|v| Specification::new(name.as_str(), v)))
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct EntityNormalizer {
    categories: CategoryResolver,
}

impl EntityNormalizer {
    pub fn new(categories: CategoryResolver) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &CategoryResolver {
        &self.categories
    }

    /// Convert any raw payload into a fully defaulted entity, or `None` when
    /// no entity object with an identifier can be found.
    pub fn normalize(&self, raw: &Value, requested_id: &str) -> Option<Entity> {
        let located = decode_envelope(raw, requested_id)?;
        Some(self.build(&located))
    }

    fn build(&self, raw: &RawEntity<'_>) -> Entity {
        let fields = raw.fields;
        let name = text_field(fields, &["name", "title"]);
        let reviews = fields
            .get("reviews")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let review_count = count_field(fields, &["reviewCount", "numReviews", "ratingsQuantity"])
            .unwrap_or(reviews.len() as u32);
        let category = self
            .categories
            .resolve(&RawCategory::from_value(fields.get("category")), &name);

        Entity {
            id: raw.id.clone(),
            description: text_field(fields, &["description"]),
            price: number_field(fields, &["price"]).unwrap_or(0.0),
            discount_price: number_field(fields, &["discountPrice"]),
            stock: count_field(fields, &["stock", "countInStock", "quantity"]).unwrap_or(0),
            images: images(fields),
            category,
            ratings_average: number_field(fields, &["ratingsAverage", "rating", "averageRating"])
                .map(|r| r.min(5.0))
                .unwrap_or(0.0),
            review_count,
            specifications: specifications(fields),
            reviews,
            name,
        }
    }
}
