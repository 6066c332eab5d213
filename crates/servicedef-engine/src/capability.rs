//! Implied-grant expansion and marker access-type synthesis.

use crate::service_def::{AccessTypeDef, ServiceDef};
use crate::types::{is_access_type_marker, ACCESS_TYPE_MARKERS, ACCESS_TYPE_MARKER_ALL};
use std::collections::{BTreeSet, HashMap};

/// Maps every access type of the definition to itself plus its directly
/// declared implied grants.
///
/// The expansion is one level deep; implied grants of implied grants are not
/// followed, so cycles in the implication graph are harmless.
pub fn expanded_implied_grants(service_def: &ServiceDef) -> HashMap<String, BTreeSet<String>> {
    let mut ret: HashMap<String, BTreeSet<String>> = HashMap::new();

    for access_type in &service_def.access_types {
        let grants = ret.entry(access_type.name.clone()).or_default();
        grants.extend(access_type.implied_grants.iter().cloned());
        grants.insert(access_type.name.clone());
    }

    ret
}

/// Synthesizes the six marker access types from `access_type_defs`.
///
/// Every non-marker access type contributes itself and its implied grants to
/// `_ALL`, and to the marker of its category when it has one. Marker item ids
/// continue after the largest existing id, in marker declaration order, and
/// saturate at `i64::MAX`.
pub fn marker_access_types(access_type_defs: &[AccessTypeDef]) -> Vec<AccessTypeDef> {
    let mut grants = marker_access_type_grants(access_type_defs);
    let mut item_id = max_item_id(access_type_defs);

    ACCESS_TYPE_MARKERS
        .iter()
        .map(|marker| {
            item_id = item_id.saturating_add(1);
            AccessTypeDef {
                item_id: Some(item_id),
                name: marker.to_string(),
                label: marker.to_string(),
                rb_key_label: String::new(),
                category: None,
                implied_grants: grants.remove(*marker).unwrap_or_default(),
            }
        })
        .collect()
}

/// Returns the definition with its marker access types derived from its
/// access types.
pub fn with_marker_access_types(mut service_def: ServiceDef) -> ServiceDef {
    service_def.marker_access_types = marker_access_types(&service_def.access_types);
    service_def
}

fn marker_access_type_grants(
    access_type_defs: &[AccessTypeDef],
) -> HashMap<&'static str, BTreeSet<String>> {
    let mut ret: HashMap<&'static str, BTreeSet<String>> = ACCESS_TYPE_MARKERS
        .iter()
        .map(|marker| (*marker, BTreeSet::new()))
        .collect();

    for access_type in access_type_defs {
        if access_type.name.trim().is_empty() || is_access_type_marker(&access_type.name) {
            continue;
        }

        add_to_marker_grants(access_type, ret.entry(ACCESS_TYPE_MARKER_ALL).or_default());

        if let Some(category) = access_type.category {
            add_to_marker_grants(access_type, ret.entry(category.marker()).or_default());
        }
    }

    ret
}

fn add_to_marker_grants(access_type: &AccessTypeDef, grants: &mut BTreeSet<String>) {
    grants.insert(access_type.name.clone());
    grants.extend(access_type.implied_grants.iter().cloned());
}

fn max_item_id(access_type_defs: &[AccessTypeDef]) -> i64 {
    access_type_defs
        .iter()
        .filter_map(|a| a.item_id)
        .fold(-1, i64::max)
}
