//! Property-Based Tests for Resolution Totality and Normalization
//!
//! **Totality**: for any non-blank id, with every live source down, a
//! resolution delivers exactly one entity whose id is the requested id.
//!
//! **Envelope independence**: a product object normalizes to the same
//! entity whichever known envelope it arrives in.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use showroom_resolver::EntityNormalizer;
use showroom_test_utils::assertions::assert_single_delivery;
use showroom_test_utils::fixtures::{memory_cache, orchestrator, test_config};
use showroom_test_utils::generators::{arb_entity_id, arb_enveloped_payload, arb_product_object};
use showroom_test_utils::{RecordingSink, ScriptedTransport};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("Failed to build test runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_resolution_is_total(id in arb_entity_id()) {
        let rt = runtime();
        let (outcome, sink) = rt.block_on(async {
            let orchestrator = orchestrator(
                &test_config(),
                Arc::new(ScriptedTransport::offline()),
                Some(memory_cache()),
            );
            let sink = RecordingSink::new();
            let outcome = orchestrator.resolve(&id, &sink).await;
            (outcome, sink)
        });

        let outcome = outcome.expect("non-blank id should be accepted");
        prop_assert!(outcome.is_resolved());
        assert_single_delivery(&sink);
        prop_assert_eq!(&sink.resolved()[0].0.id, &id);
    }

    #[test]
    fn prop_envelope_does_not_change_entity(
        object in arb_product_object("p1".to_string()),
        shape in 0usize..5,
    ) {
        let payload = match shape {
            0 => object.clone(),
            1 => json!({ "data": object.clone() }),
            2 => json!({ "success": true, "data": object.clone() }),
            3 => json!({ "data": object.clone(), "formats": {} }),
            _ => json!({ "data": [json!({"_id": "other"}), object.clone()] }),
        };
        let normalizer = EntityNormalizer::default();
        let bare = normalizer.normalize(&object, "p1");
        let wrapped = normalizer.normalize(&payload, "p1");

        prop_assert!(bare.is_some());
        prop_assert_eq!(bare, wrapped);
    }

    #[test]
    fn prop_normalized_fields_are_in_range(payload in arb_enveloped_payload("p1".to_string())) {
        let entity = EntityNormalizer::default()
            .normalize(&payload, "p1")
            .expect("generated payloads carry an id");
        prop_assert!(entity.price >= 0.0);
        prop_assert!((0.0..=5.0).contains(&entity.ratings_average));
        prop_assert!(!entity.category.name.is_empty());
        prop_assert!(!entity.category.slug.is_empty());
    }
}
