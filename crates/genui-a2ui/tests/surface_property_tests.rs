//! Property-based tests for message validation and the surface reducer
//!
//! **Property 1: Validation Independence**
//! *For any* message, the verdict for one entry SHALL NOT depend on the
//! other entries in the same message.
//!
//! **Property 2: Reducer Idempotence**
//! *For any* validated message, applying it twice SHALL equal applying it once.
//!
//! **Property 3: Stable Ordering**
//! *For any* sequence of messages, ids SHALL appear in first-insertion order.
//!
//! **Property 4: Unknown-Type Determinism**
//! *For any* unregistered type name, validation SHALL forward the entry
//! unchanged and the surface SHALL mark it unknown.
//!
//! **Property 5: Catalog Round-Trip**
//! *For any* registered type name, `get` and `has` SHALL find it and the
//! prompt text SHALL describe it.

use genui_a2ui::prelude::*;
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,6}".prop_map(|s| s)
}

fn arb_unknown_type() -> impl Strategy<Value = String> {
    "Zz[A-Z][a-zA-Z]{2,10}".prop_map(|s| s)
}

/// A component entry that is valid against the standard catalog
fn arb_valid_entry() -> impl Strategy<Value = Value> {
    let callout = (arb_id(), "[a-zA-Z ]{0,20}")
        .prop_map(|(id, body)| json!({ "id": id, "component": { "Callout": { "data": { "body": body } } } }));
    let stat = (arb_id(), any::<i32>()).prop_map(|(id, value)| {
        json!({ "id": id, "component": { "StatCard": { "data": { "label": "n", "value": value } } } })
    });
    let timeline = (arb_id(), 1900i32..2100).prop_map(|(id, year)| {
        json!({ "id": id, "component": { "Timeline": { "data": {
            "events": [{ "start_date": { "year": year } }]
        } } } })
    });
    prop_oneof![callout, stat, timeline]
}

/// A component entry that fails either structurally or against its schema
fn arb_invalid_entry() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!(42)),
        Just(json!({ "component": {} })),
        arb_id().prop_map(|id| json!({ "id": id, "component": { "Callout": { "data": { "body": 7 } } } })),
        arb_id().prop_map(|id| json!({
            "id": id,
            "component": { "Callout": { "data": { "body": "a" } }, "StatCard": { "data": {} } }
        })),
    ]
}

fn arb_entry() -> impl Strategy<Value = Value> {
    prop_oneof![3 => arb_valid_entry(), 1 => arb_invalid_entry()]
}

fn envelope(components: Vec<Value>) -> Value {
    json!({ "surfaceUpdate": { "components": components } })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_validation_is_independent_per_entry(
        entries in prop::collection::vec(arb_entry(), 1..8),
        noise in arb_invalid_entry(),
    ) {
        let catalog = standard_catalog();

        let alone: Vec<bool> = entries
            .iter()
            .map(|entry| validate_message(&catalog, &envelope(vec![entry.clone()])).is_clean())
            .collect();

        let mut with_noise = entries.clone();
        with_noise.insert(0, noise);
        let together = validate_message(&catalog, &envelope(with_noise));

        for (offset, clean) in alone.iter().enumerate() {
            let index = offset + 1;
            let accepted = together.valid.iter().any(|e| e.index == index);
            prop_assert_eq!(accepted, *clean, "entry {} changed verdict", index);
        }
    }

    #[test]
    fn prop_apply_is_idempotent(entries in prop::collection::vec(arb_entry(), 0..10)) {
        let catalog = standard_catalog();
        let validation = validate_message(&catalog, &envelope(entries));

        let once = SurfaceState::new().apply_message(&validation);
        let twice = once.apply_message(&validation);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_ids_keep_first_insertion_order(
        batches in prop::collection::vec(prop::collection::vec(arb_valid_entry(), 0..5), 1..5),
    ) {
        let catalog = standard_catalog();
        let mut expected: Vec<String> = Vec::new();
        let mut state = SurfaceState::new();

        for batch in batches {
            for entry in &batch {
                let id = entry["id"].as_str().unwrap().to_string();
                if !expected.contains(&id) {
                    expected.push(id);
                }
            }
            state = state.apply_raw(&catalog, &envelope(batch)).0;
        }

        let actual: Vec<String> = state.ids().map(str::to_string).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_unknown_types_are_forwarded(
        id in arb_id(),
        type_name in arb_unknown_type(),
        payload in prop::collection::btree_map("[a-z]{1,5}", any::<i64>(), 0..4),
    ) {
        let catalog = standard_catalog();
        let data = serde_json::to_value(&payload).unwrap();
        let mut component = serde_json::Map::new();
        component.insert(type_name.clone(), json!({ "data": data.clone() }));
        let raw = envelope(vec![json!({ "id": id, "component": component })]);

        let (state, validation) = SurfaceState::new().apply_raw(&catalog, &raw);
        prop_assert!(validation.is_clean());
        prop_assert_eq!(&validation.valid[0].data, &data);

        let entry = state.get(&id).unwrap();
        prop_assert!(!entry.known);
        prop_assert_eq!(&entry.type_name, &type_name);
    }

    #[test]
    fn prop_catalog_round_trip(names in prop::collection::hash_set("[A-Z][a-zA-Z]{2,12}", 1..6)) {
        let mut catalog = Catalog::new();
        for name in &names {
            let entry = CatalogEntry::new(name.clone(), format!("{} purpose", name), accept_all);
            prop_assert!(catalog.register(entry).is_ok());
        }

        let prompt = catalog.prompt_catalog_text();
        for name in &names {
            prop_assert!(catalog.has(name));
            prop_assert_eq!(catalog.get(name).unwrap().type_name(), name.as_str());
            let heading = format!("### {}\n", name);
            prop_assert!(prompt.contains(&heading));
        }
        prop_assert_eq!(catalog.len(), names.len());
    }
}

fn accept_all(_: &Value, _: PayloadTarget) -> Vec<FieldError> {
    Vec::new()
}
