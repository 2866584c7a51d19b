//! Showroom Test Utilities
//!
//! Shared test infrastructure for the showroom workspace:
//! - Scripted HTTP transport with a call log
//! - Recording resolution sink
//! - Proptest generators for ids and raw payloads
//! - Fixtures and assertions

pub use showroom_core::{
    Category, EndpointPolicy, Entity, FetchError, ResolutionAttempt, ResolverConfig,
    Specification,
};
pub use showroom_resolver::{
    HttpTransport, RawResponse, ResolutionOrchestrator, ResolutionOutcome, ResolutionSink,
};
pub use showroom_storage::{InMemoryStore, LocalCache};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// SCRIPTED TRANSPORT
// ============================================================================

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// 200 with a JSON body.
    Json(Value),
    /// Arbitrary status and raw body.
    Body { status: u16, body: String },
    /// Connection-level failure.
    Network,
    /// Transport-reported timeout.
    Timeout,
    /// Wait, then reply.
    Delayed(Duration, Box<Scripted>),
}

/// HTTP transport answering from a per-URL script.
///
/// Each URL replays its script in order and then keeps repeating the last
/// entry. Unscripted URLs fail with a network error. Every call is logged.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, (Vec<Scripted>, usize)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Every URL fails.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn script(self, url: impl Into<String>, replies: Vec<Scripted>) -> Self {
        lock(&self.scripts).insert(url.into(), (replies, 0));
        self
    }

    pub fn respond_json(self, url: impl Into<String>, body: Value) -> Self {
        self.script(url, vec![Scripted::Json(body)])
    }

    pub fn respond_status(self, url: impl Into<String>, status: u16) -> Self {
        self.script(
            url,
            vec![Scripted::Body {
                status,
                body: String::new(),
            }],
        )
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        lock(&self.calls).iter().filter(|u| *u == url).count()
    }

    fn next_reply(&self, url: &str) -> Option<Scripted> {
        let mut scripts = lock(&self.scripts);
        let (replies, cursor) = scripts.get_mut(url)?;
        let reply = replies.get(*cursor).or_else(|| replies.last())?.clone();
        *cursor += 1;
        Some(reply)
    }
}

async fn play(url: &str, timeout: Duration, reply: Scripted) -> Result<RawResponse, FetchError> {
    let mut reply = reply;
    loop {
        match reply {
            Scripted::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            Scripted::Json(value) => return Ok(RawResponse::new(200, value.to_string())),
            Scripted::Body { status, body } => return Ok(RawResponse::new(status, body)),
            Scripted::Network => {
                return Err(FetchError::Network {
                    url: url.to_string(),
                    reason: "connection refused".to_string(),
                })
            }
            Scripted::Timeout => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    after_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<RawResponse, FetchError> {
        lock(&self.calls).push(url.to_string());
        let reply = self.next_reply(url).unwrap_or(Scripted::Network);
        play(url, timeout, reply).await
    }
}

// ============================================================================
// RECORDING SINK
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Resolved { entity: Entity, source_label: String },
    Degraded(String),
    Failed(String),
}

/// Sink that records every callback in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        lock(&self.events).clone()
    }

    /// `(entity, source_label)` for every `on_resolved`.
    pub fn resolved(&self) -> Vec<(Entity, String)> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Resolved {
                    entity,
                    source_label,
                } => Some((entity.clone(), source_label.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn degraded(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Degraded(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failed(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Failed(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ResolutionSink for RecordingSink {
    fn on_resolved(&self, entity: &Entity, source_label: &str) {
        lock(&self.events).push(SinkEvent::Resolved {
            entity: entity.clone(),
            source_label: source_label.to_string(),
        });
    }

    fn on_degraded(&self, reason: &str) {
        lock(&self.events).push(SinkEvent::Degraded(reason.to_string()));
    }

    fn on_failed(&self, reason: &str) {
        lock(&self.events).push(SinkEvent::Failed(reason.to_string()));
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for ids and raw backend payloads.

    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// 24 lowercase hex characters, like a backend object id.
    pub fn arb_object_id() -> impl Strategy<Value = String> {
        "[0-9a-f]{24}"
    }

    /// Human-readable slug ids such as `unknown-chair-42`.
    pub fn arb_slug_id() -> impl Strategy<Value = String> {
        "[a-z]{1,10}(-[a-z0-9]{1,8}){0,3}"
    }

    /// Any non-blank id, including garbage.
    pub fn arb_entity_id() -> impl Strategy<Value = String> {
        prop_oneof![
            arb_object_id(),
            arb_slug_id(),
            "[[:graph:]]{1,32}",
        ]
    }

    pub fn arb_product_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Elegant Wooden Sofa".to_string()),
            Just("Oak Dining Table".to_string()),
            Just("Bar Stool".to_string()),
            Just("Mirror Wardrobe".to_string()),
            Just("Bunk Bed".to_string()),
            "[A-Z][a-z]{2,10}( [A-Z][a-z]{2,10}){0,2}",
        ]
    }

    /// A bare product object for `id`, with a random subset of fields.
    pub fn arb_product_object(id: String) -> impl Strategy<Value = Value> {
        (
            proptest::option::of(arb_product_name()),
            proptest::option::of(0.0f64..5000.0),
            proptest::option::of(0u32..500),
            proptest::option::of(prop::collection::vec("https://img\\.test/[a-z]{3,8}\\.jpg", 0..4)),
        )
            .prop_map(move |(name, price, stock, images)| {
                let mut object = json!({ "_id": id.clone() });
                if let Some(name) = name {
                    object["name"] = json!(name);
                }
                if let Some(price) = price {
                    object["price"] = json!(price);
                }
                if let Some(stock) = stock {
                    object["stock"] = json!(stock);
                }
                if let Some(images) = images {
                    object["images"] = json!(images);
                }
                object
            })
    }

    /// A product object for `id` wrapped in one of the known envelopes.
    pub fn arb_enveloped_payload(id: String) -> impl Strategy<Value = Value> {
        (arb_product_object(id), 0usize..5).prop_map(|(object, shape)| match shape {
            0 => object,
            1 => json!({ "data": object }),
            2 => json!({ "success": true, "data": object }),
            3 => json!({ "data": object, "formats": { "raw": true } }),
            _ => json!({ "data": [object] }),
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common resolver scenarios.

    use super::*;
    use serde_json::json;

    pub const LOCAL_BASE: &str = "http://local.test";
    pub const DEPLOYED_BASE: &str = "https://deployed.test";

    /// Both environments, tiny timeouts and no retries.
    pub fn test_config() -> ResolverConfig {
        ResolverConfig::defaults(DEPLOYED_BASE)
            .with_local_base_url(LOCAL_BASE)
            .with_uniform_policy(EndpointPolicy::new(250, 0, 1))
    }

    pub fn memory_cache() -> Arc<LocalCache> {
        Arc::new(LocalCache::new(
            Arc::new(InMemoryStore::new()),
            showroom_core::config::DEFAULT_CACHE_NAMESPACE,
        ))
    }

    /// Production source list over `transport`.
    pub fn orchestrator(
        config: &ResolverConfig,
        transport: Arc<ScriptedTransport>,
        cache: Option<Arc<LocalCache>>,
    ) -> ResolutionOrchestrator {
        match ResolutionOrchestrator::from_config(config, transport, cache, None) {
            Ok(orchestrator) => orchestrator,
            Err(e) => panic!("fixture config should be valid: {}", e),
        }
    }

    pub fn product_payload(id: &str, name: &str, price: f64) -> Value {
        json!({
            "_id": id,
            "name": name,
            "description": format!("{} description", name),
            "price": price,
            "stock": 4,
            "images": [format!("https://img.test/{}.jpg", id)],
            "ratingsAverage": 4.5,
            "specifications": [{ "name": "Material", "value": "Oak" }],
        })
    }

    pub fn sample_entity(id: &str) -> Entity {
        Entity {
            id: id.to_string(),
            name: "Oak Dining Table".to_string(),
            description: "Extendable".to_string(),
            price: 499.0,
            discount_price: Some(449.0),
            stock: 3,
            images: vec![format!("https://img.test/{}.jpg", id)],
            category: Category::new("680c9484ab11e96a288ef6da", "Tables"),
            ratings_average: 4.2,
            review_count: 2,
            specifications: vec![Specification::new("Material", "Oak")],
            reviews: Vec::new(),
        }
    }

    pub fn url(base: &str, path: &str, id: &str) -> String {
        format!("{}{}{}", base, path, id)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over resolution outcomes and sink recordings.

    use super::*;

    #[track_caller]
    pub fn assert_resolved_from(outcome: &ResolutionOutcome, label: &str) {
        match outcome {
            ResolutionOutcome::Resolved { source_label, .. } => {
                assert_eq!(source_label, label, "Resolved from the wrong source")
            }
            other => panic!("Expected Resolved from {}, got: {:?}", label, other),
        }
    }

    /// Exactly one `on_resolved`, and no `on_failed`.
    #[track_caller]
    pub fn assert_single_delivery(sink: &RecordingSink) {
        let resolved = sink.resolved();
        assert_eq!(resolved.len(), 1, "Expected one delivery, got: {:?}", sink.events());
        assert!(sink.failed().is_empty(), "Unexpected failure: {:?}", sink.failed());
    }

    #[track_caller]
    pub fn assert_no_callbacks(sink: &RecordingSink) {
        assert!(sink.events().is_empty(), "Expected no callbacks, got: {:?}", sink.events());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_transport_replays_then_repeats_last() {
        let transport = ScriptedTransport::offline().script(
            "http://x",
            vec![Scripted::Network, Scripted::Json(json!({"ok": true}))],
        );
        let timeout = Duration::from_millis(10);

        assert!(transport.get("http://x", timeout).await.is_err());
        let second = transport.get("http://x", timeout).await.unwrap();
        assert_eq!(second.status, 200);
        let third = transport.get("http://x", timeout).await.unwrap();
        assert_eq!(third.body, second.body);

        assert!(transport.get("http://unscripted", timeout).await.is_err());
        assert_eq!(transport.call_count("http://x"), 3);
        assert_eq!(transport.calls().len(), 4);
    }

    #[test]
    fn test_recording_sink_orders_events() {
        let sink = RecordingSink::new();
        sink.on_resolved(&Entity::with_id("p1"), "synthetic");
        sink.on_degraded("placeholder");

        assert_eq!(sink.resolved().len(), 1);
        assert_eq!(sink.degraded(), vec!["placeholder".to_string()]);
        assert!(matches!(sink.events()[1], SinkEvent::Degraded(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_ids_are_not_blank(id in generators::arb_entity_id()) {
            prop_assert!(!id.trim().is_empty());
        }

        #[test]
        fn prop_payload_carries_id(payload in generators::arb_enveloped_payload("p1".to_string())) {
            let text = payload.to_string();
            prop_assert!(text.contains("\"p1\""));
        }
    }
}
