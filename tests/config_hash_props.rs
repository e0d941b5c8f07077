//! Config-hash determinism properties.

use proptest::prelude::*;
use serde_json::json;
use telemetry_store::core::config::stable_json_hash;

/// Flat JSON objects with string keys and scalar values, the shape of
/// process config snapshots.
fn config_body() -> impl Strategy<Value = serde_json::Value> {
    prop::collection::btree_map(
        "[a-z_]{1,12}",
        prop_oneof![
            any::<i64>().prop_map(serde_json::Value::from),
            "[ -~]{0,20}".prop_map(serde_json::Value::from),
            any::<bool>().prop_map(serde_json::Value::from),
        ],
        0..8,
    )
    .prop_map(|map| serde_json::Value::Object(map.into_iter().collect()))
}

proptest! {
    #[test]
    fn hash_is_deterministic(body in config_body()) {
        prop_assert_eq!(
            stable_json_hash(&body).unwrap(),
            stable_json_hash(&body).unwrap()
        );
    }

    #[test]
    fn hash_survives_json_round_trip(body in config_body()) {
        let round_tripped: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&body).unwrap()).unwrap();
        prop_assert_eq!(
            stable_json_hash(&body).unwrap(),
            stable_json_hash(&round_tripped).unwrap()
        );
    }

    #[test]
    fn changed_field_changes_hash(body in config_body(), probe in any::<i64>()) {
        let mut changed = body.clone();
        // '#' is outside the generated-key alphabet, so this is always a
        // genuine field change.
        changed["#probe"] = json!(probe);
        prop_assert_ne!(
            stable_json_hash(&body).unwrap(),
            stable_json_hash(&changed).unwrap()
        );
    }
}
