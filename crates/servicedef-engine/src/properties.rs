//! Property tests over generated service definitions.

use proptest::prelude::*;

use crate::capability::marker_access_types;
use crate::merge::merge_resource_def;
use crate::normalize::{normalize, normalize_access_type_defs};
use crate::service_def::{AccessTypeDef, DataMaskDef, ResourceDef, RowFilterDef, ServiceDef};
use crate::types::{is_access_type_marker, AccessTypeCategory, ACCESS_TYPE_MARKERS};

// ============================================================================
// Strategies
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("database".to_string()),
        Just("table".to_string()),
        Just("column".to_string()),
        Just("udf".to_string()),
        "[a-z]{1,6}",
    ]
}

fn arb_access_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}",
        "[a-z]{1,6}".prop_map(|n| format!("hive:{n}")),
        "[a-z]{1,6}".prop_map(|n| format!("hdfs:{n}")),
        Just("hive:hive:select".to_string()),
        Just("_ALL".to_string()),
    ]
}

fn arb_category() -> impl Strategy<Value = Option<AccessTypeCategory>> {
    prop_oneof![
        Just(None),
        Just(Some(AccessTypeCategory::Create)),
        Just(Some(AccessTypeCategory::Read)),
        Just(Some(AccessTypeCategory::Update)),
        Just(Some(AccessTypeCategory::Delete)),
        Just(Some(AccessTypeCategory::Manage)),
    ]
}

fn arb_resource_def() -> impl Strategy<Value = ResourceDef> {
    (
        arb_name(),
        proptest::option::of(0i64..100),
        proptest::option::of(0i32..50),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        "[a-z]{0,4}",
        "[a-z]{0,4}",
        proptest::collection::vec("[a-z]{1,4}", 0..3),
    )
        .prop_map(
            |(name, item_id, level, mandatory, recursive, leaf, label, ui_hint, restrictions)| {
                ResourceDef {
                    item_id,
                    name,
                    level,
                    mandatory,
                    recursive_supported: recursive,
                    is_valid_leaf: leaf,
                    label,
                    ui_hint,
                    access_type_restrictions: restrictions,
                    ..Default::default()
                }
            },
        )
}

fn arb_access_type_def() -> impl Strategy<Value = AccessTypeDef> {
    (
        arb_access_name(),
        proptest::option::of(0i64..100),
        arb_category(),
        proptest::collection::btree_set(arb_access_name(), 0..4),
        "[a-z]{0,4}",
    )
        .prop_map(|(name, item_id, category, implied_grants, label)| AccessTypeDef {
            item_id,
            name,
            label,
            category,
            implied_grants,
            ..Default::default()
        })
}

fn arb_service_def() -> impl Strategy<Value = ServiceDef> {
    (
        proptest::collection::vec(arb_resource_def(), 0..5),
        proptest::collection::vec(arb_access_type_def(), 0..5),
        proptest::collection::vec(arb_resource_def(), 0..4),
        proptest::collection::vec(arb_access_type_def(), 0..4),
        proptest::collection::vec(arb_access_type_def(), 0..3),
    )
        .prop_map(
            |(resources, access_types, mask_resources, mask_access_types, filter_access_types)| {
                ServiceDef {
                    name: "hive".to_string(),
                    resources,
                    access_types,
                    data_mask_def: Some(DataMaskDef {
                        resources: mask_resources.clone(),
                        access_types: mask_access_types,
                        ..Default::default()
                    }),
                    row_filter_def: Some(RowFilterDef {
                        resources: mask_resources,
                        access_types: filter_access_types,
                    }),
                    ..Default::default()
                }
            },
        )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: merging never changes identity or topology, and can only add
    /// a mandatory requirement.
    #[test]
    fn prop_merge_keeps_identity(base in arb_resource_def(), delta in arb_resource_def()) {
        let merged = merge_resource_def(&base, &delta);

        prop_assert_eq!(&merged.name, &base.name);
        prop_assert_eq!(merged.item_id, base.item_id);
        prop_assert_eq!(merged.level, base.level);
        prop_assert_eq!(&merged.parent, &base.parent);
        prop_assert_eq!(
            merged.mandatory.unwrap_or(false),
            base.mandatory.unwrap_or(false) || delta.mandatory.unwrap_or(false)
        );
        prop_assert_eq!(&merged.ui_hint, &delta.ui_hint);
        prop_assert_eq!(merged.is_valid_leaf, delta.is_valid_leaf);
    }

    /// Property: normalizing twice equals normalizing once.
    #[test]
    fn prop_normalize_is_idempotent(service_def in arb_service_def()) {
        let once = normalize(service_def);
        let twice = normalize(once.clone());

        prop_assert_eq!(once, twice);
    }

    /// Property: stripping the component prefix twice equals stripping once,
    /// and no qualified name survives.
    #[test]
    fn prop_access_type_normalization_is_idempotent(service_def in arb_service_def()) {
        let once = normalize_access_type_defs(service_def, "hive");
        let twice = normalize_access_type_defs(once.clone(), "hive");

        for access_type in &once.access_types {
            prop_assert!(!access_type.name.contains(':'));
            prop_assert!(access_type.implied_grants.iter().all(|g| !g.contains(':')));
        }
        prop_assert_eq!(once, twice);
    }

    /// Property: markers come in declaration order with ids above every
    /// existing id, and `_ALL` covers every other marker.
    #[test]
    fn prop_marker_access_types(
        access_types in proptest::collection::vec(arb_access_type_def(), 0..8)
    ) {
        let markers = marker_access_types(&access_types);
        let max_id = access_types.iter().filter_map(|a| a.item_id).max().unwrap_or(-1);

        prop_assert_eq!(markers.len(), ACCESS_TYPE_MARKERS.len());
        for (i, marker) in markers.iter().enumerate() {
            prop_assert_eq!(marker.name.as_str(), ACCESS_TYPE_MARKERS[i]);
            prop_assert_eq!(marker.item_id, Some(max_id + 1 + i as i64));
            prop_assert!(marker.implied_grants.iter().all(|g| !g.trim().is_empty()));
        }

        let all = &markers[markers.len() - 1].implied_grants;
        for marker in &markers {
            prop_assert!(marker.implied_grants.is_subset(all));
        }

        for access_type in access_types.iter().filter(|a| !is_access_type_marker(&a.name)) {
            prop_assert!(all.contains(&access_type.name));
        }
    }
}
