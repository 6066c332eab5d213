//! Normalization of a service definition before it is loaded by a policy engine.
//!
//! Both passes consume the definition and return the normalized value, and both
//! are idempotent.

use crate::merge::{merge_access_type_def, merge_resource_def};
use crate::service_def::{AccessTypeDef, ResourceDef, ServiceDef};
use crate::types::COMPONENT_ACCESSTYPE_SEPARATOR;
use tracing::debug;

/// Replaces every resource and access type listed by the data-mask and
/// row-filter specializations with its merge onto the same-named base entry.
///
/// Entries with no base counterpart are kept as listed.
pub fn normalize(mut service_def: ServiceDef) -> ServiceDef {
    if let Some(data_mask_def) = service_def.data_mask_def.as_mut() {
        data_mask_def.resources = merge_resources(
            &service_def.resources,
            std::mem::take(&mut data_mask_def.resources),
        );
        data_mask_def.access_types = merge_access_types(
            &service_def.access_types,
            std::mem::take(&mut data_mask_def.access_types),
        );

        debug!(
            service = %service_def.name,
            resources = data_mask_def.resources.len(),
            access_types = data_mask_def.access_types.len(),
            "normalized data-mask definition"
        );
    }

    if let Some(row_filter_def) = service_def.row_filter_def.as_mut() {
        row_filter_def.resources = merge_resources(
            &service_def.resources,
            std::mem::take(&mut row_filter_def.resources),
        );
        row_filter_def.access_types = merge_access_types(
            &service_def.access_types,
            std::mem::take(&mut row_filter_def.access_types),
        );

        debug!(
            service = %service_def.name,
            resources = row_filter_def.resources.len(),
            access_types = row_filter_def.access_types.len(),
            "normalized row-filter definition"
        );
    }

    service_def
}

fn merge_resources(base: &[ResourceDef], listed: Vec<ResourceDef>) -> Vec<ResourceDef> {
    listed
        .into_iter()
        .map(|resource| match base.iter().find(|b| b.name == resource.name) {
            Some(base_def) => merge_resource_def(base_def, &resource),
            None => resource,
        })
        .collect()
}

fn merge_access_types(base: &[AccessTypeDef], listed: Vec<AccessTypeDef>) -> Vec<AccessTypeDef> {
    listed
        .into_iter()
        .map(|access_type| match base.iter().find(|b| b.name == access_type.name) {
            Some(base_def) => merge_access_type_def(base_def, &access_type),
            None => access_type,
        })
        .collect()
}

/// Strips the `"<component_type>:"` prefix from access-type names and their
/// implied grants, dropping entries qualified by any other component.
///
/// Applies to the access types, the marker access types, and the data-mask and
/// row-filter access types. A blank component type leaves the definition as is.
pub fn normalize_access_type_defs(mut service_def: ServiceDef, component_type: &str) -> ServiceDef {
    if component_type.trim().is_empty() {
        return service_def;
    }

    let prefix = format!("{component_type}{COMPONENT_ACCESSTYPE_SEPARATOR}");

    service_def.access_types =
        strip_component_prefix(std::mem::take(&mut service_def.access_types), &prefix);
    service_def.marker_access_types =
        strip_component_prefix(std::mem::take(&mut service_def.marker_access_types), &prefix);

    if let Some(data_mask_def) = service_def.data_mask_def.as_mut() {
        data_mask_def.access_types =
            strip_component_prefix(std::mem::take(&mut data_mask_def.access_types), &prefix);
    }

    if let Some(row_filter_def) = service_def.row_filter_def.as_mut() {
        row_filter_def.access_types =
            strip_component_prefix(std::mem::take(&mut row_filter_def.access_types), &prefix);
    }

    debug!(
        service = %service_def.name,
        component = component_type,
        access_types = service_def.access_types.len(),
        "normalized component access types"
    );

    service_def
}

fn strip_component_prefix(access_types: Vec<AccessTypeDef>, prefix: &str) -> Vec<AccessTypeDef> {
    access_types
        .into_iter()
        .filter_map(|mut access_type| {
            access_type.name = local_name(&access_type.name, prefix)?;
            access_type.implied_grants = access_type
                .implied_grants
                .iter()
                .filter_map(|grant| local_name(grant, prefix))
                .collect();
            Some(access_type)
        })
        .collect()
}

/// The component-local form of `name`, or `None` if it belongs to another
/// component. A remainder that is still qualified is treated as foreign so a
/// second pass cannot strip it again.
fn local_name(name: &str, prefix: &str) -> Option<String> {
    let local = name.strip_prefix(prefix).unwrap_or(name);

    if local.contains(COMPONENT_ACCESSTYPE_SEPARATOR) {
        None
    } else {
        Some(local.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_def::{DataMaskDef, RowFilterDef};
    use crate::types::AccessTypeCategory;

    fn hive_def() -> ServiceDef {
        let mut column = ResourceDef::new("column", 3).with_parent("table");
        column.label = "Hive Column".to_string();
        column.matcher = "DefaultResourceMatcher".to_string();
        column.mandatory = Some(true);

        let mut mask_column = ResourceDef::new("column", 0);
        mask_column.ui_hint = "{ \"singleValue\": true }".to_string();
        mask_column.is_valid_leaf = Some(true);

        let mut mask_select = AccessTypeDef::new(0, "select");
        mask_select.label = String::new();

        ServiceDef::new("hive")
            .with_resource(ResourceDef::new("database", 1))
            .with_resource(ResourceDef::new("table", 2).with_parent("database"))
            .with_resource(column)
            .with_access_type(
                AccessTypeDef::new(1, "select").with_category(AccessTypeCategory::Read),
            )
            .with_access_type(AccessTypeDef::new(2, "update"))
            .with_row_filter_def(RowFilterDef {
                access_types: vec![AccessTypeDef::new(0, "select")],
                resources: vec![
                    ResourceDef::new("database", 0),
                    ResourceDef::new("table", 0),
                ],
            })
            .with_data_mask_def(DataMaskDef {
                mask_types: Vec::new(),
                access_types: vec![mask_select, AccessTypeDef::new(9, "unknown")],
                resources: vec![
                    ResourceDef::new("database", 0),
                    ResourceDef::new("table", 0),
                    mask_column,
                    ResourceDef::new("udf", 7).with_item_id(42),
                ],
            })
    }

    #[test]
    fn test_normalize_merges_data_mask_resources() {
        let normalized = normalize(hive_def());
        let mask = normalized.data_mask_def.as_ref().unwrap();

        let column = &mask.resources[2];
        assert_eq!(column.level, Some(3));
        assert_eq!(column.parent.as_deref(), Some("table"));
        assert_eq!(column.label, "Hive Column");
        assert_eq!(column.mandatory, Some(true));
        assert_eq!(column.ui_hint, "{ \"singleValue\": true }");
        assert_eq!(column.is_valid_leaf, Some(true));

        assert_eq!(mask.resources[1].parent.as_deref(), Some("database"));

        // no base counterpart
        let udf = &mask.resources[3];
        assert_eq!(udf, &ResourceDef::new("udf", 7).with_item_id(42));
    }

    #[test]
    fn test_normalize_merges_access_types() {
        let normalized = normalize(hive_def());
        let mask = normalized.data_mask_def.as_ref().unwrap();

        assert_eq!(mask.access_types[0].item_id, Some(1));
        assert_eq!(mask.access_types[0].category, Some(AccessTypeCategory::Read));
        assert_eq!(mask.access_types[0].label, "select");

        // no base counterpart
        assert_eq!(mask.access_types[1].item_id, Some(9));

        let filter = normalized.row_filter_def.as_ref().unwrap();
        assert_eq!(filter.access_types[0].item_id, Some(1));
        assert_eq!(filter.resources[1].level, Some(2));
    }

    #[test]
    fn test_normalize_without_specializations() {
        let plain = ServiceDef::new("hdfs").with_resource(ResourceDef::new("path", 1));
        assert_eq!(normalize(plain.clone()), plain);
    }

    #[test]
    fn test_normalize_idempotent() {
        let once = normalize(hive_def());
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strip_component_prefix() {
        let service_def = ServiceDef::new("tag")
            .with_access_type(
                AccessTypeDef::new(1, "hive:select").with_implied_grants(["hive:read"]),
            )
            .with_access_type(AccessTypeDef::new(2, "hdfs:read"))
            .with_access_type(
                AccessTypeDef::new(3, "hive:all")
                    .with_implied_grants(["hive:select", "hdfs:read", "lock"]),
            );

        let normalized = normalize_access_type_defs(service_def, "hive");
        let names: Vec<&str> = normalized
            .access_types
            .iter()
            .map(|a| a.name.as_str())
            .collect();

        assert_eq!(names, vec!["select", "all"]);
        assert!(normalized.access_types[0].implied_grants.contains("read"));

        let all_grants: Vec<&str> = normalized.access_types[1]
            .implied_grants
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(all_grants, vec!["lock", "select"]);
    }

    #[test]
    fn test_strip_applies_to_every_access_type_list() {
        let mut service_def = ServiceDef::new("tag");
        service_def.marker_access_types = vec![AccessTypeDef::new(10, "hive:_ALL")];
        service_def.data_mask_def = Some(DataMaskDef {
            access_types: vec![
                AccessTypeDef::new(1, "hive:select"),
                AccessTypeDef::new(2, "kafka:publish"),
            ],
            ..Default::default()
        });
        service_def.row_filter_def = Some(RowFilterDef {
            access_types: vec![AccessTypeDef::new(1, "hive:select")],
            ..Default::default()
        });

        let normalized = normalize_access_type_defs(service_def, "hive");

        assert_eq!(normalized.marker_access_types[0].name, "_ALL");
        let mask = normalized.data_mask_def.unwrap();
        assert_eq!(mask.access_types.len(), 1);
        assert_eq!(mask.access_types[0].name, "select");
        assert_eq!(normalized.row_filter_def.unwrap().access_types[0].name, "select");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let service_def = ServiceDef::new("tag")
            .with_access_type(AccessTypeDef::new(1, "hive:select"))
            .with_access_type(AccessTypeDef::new(2, "hive:hive:select"))
            .with_access_type(AccessTypeDef::new(3, "update"));

        let once = normalize_access_type_defs(service_def, "hive");
        let twice = normalize_access_type_defs(once.clone(), "hive");

        assert_eq!(once, twice);
        assert_eq!(once.access_types.len(), 2);
    }

    #[test]
    fn test_blank_component_type_is_noop() {
        let service_def = ServiceDef::new("tag").with_access_type(AccessTypeDef::new(1, "hive:select"));
        let normalized = normalize_access_type_defs(service_def.clone(), "  ");
        assert_eq!(normalized, service_def);
    }
}
