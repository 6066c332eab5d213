//! Core types shared across the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// String-keyed option map carried by definitions, matchers and enrichers.
pub type Options = HashMap<String, String>;

/// Separator between a component type and an access-type name, as in `hive:select`.
pub const COMPONENT_ACCESSTYPE_SEPARATOR: &str = ":";

pub const ACCESS_TYPE_MARKER_CREATE: &str = "_CREATE";
pub const ACCESS_TYPE_MARKER_READ: &str = "_READ";
pub const ACCESS_TYPE_MARKER_UPDATE: &str = "_UPDATE";
pub const ACCESS_TYPE_MARKER_DELETE: &str = "_DELETE";
pub const ACCESS_TYPE_MARKER_MANAGE: &str = "_MANAGE";
pub const ACCESS_TYPE_MARKER_ALL: &str = "_ALL";

/// Marker access types in declaration order. Synthesized item ids follow this order.
pub const ACCESS_TYPE_MARKERS: [&str; 6] = [
    ACCESS_TYPE_MARKER_CREATE,
    ACCESS_TYPE_MARKER_READ,
    ACCESS_TYPE_MARKER_UPDATE,
    ACCESS_TYPE_MARKER_DELETE,
    ACCESS_TYPE_MARKER_MANAGE,
    ACCESS_TYPE_MARKER_ALL,
];

/// Returns true if `name` is one of the synthesized marker access types.
pub fn is_access_type_marker(name: &str) -> bool {
    ACCESS_TYPE_MARKERS.contains(&name)
}

/// Category of an access type, used to aggregate permissions into markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessTypeCategory {
    Create,
    Read,
    Update,
    Delete,
    Manage,
}

impl AccessTypeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessTypeCategory::Create => "CREATE",
            AccessTypeCategory::Read => "READ",
            AccessTypeCategory::Update => "UPDATE",
            AccessTypeCategory::Delete => "DELETE",
            AccessTypeCategory::Manage => "MANAGE",
        }
    }

    /// The marker access type that aggregates this category.
    pub fn marker(&self) -> &'static str {
        match self {
            AccessTypeCategory::Create => ACCESS_TYPE_MARKER_CREATE,
            AccessTypeCategory::Read => ACCESS_TYPE_MARKER_READ,
            AccessTypeCategory::Update => ACCESS_TYPE_MARKER_UPDATE,
            AccessTypeCategory::Delete => ACCESS_TYPE_MARKER_DELETE,
            AccessTypeCategory::Manage => ACCESS_TYPE_MARKER_MANAGE,
        }
    }
}

/// Kind of change carried by a policy delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyChangeType {
    Create,
    Update,
    Delete,
}

impl Default for PolicyChangeType {
    fn default() -> Self {
        PolicyChangeType::Update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert!(is_access_type_marker("_READ"));
        assert!(!is_access_type_marker("read"));
        assert_eq!(ACCESS_TYPE_MARKERS.last(), Some(&ACCESS_TYPE_MARKER_ALL));
    }

    #[test]
    fn test_category_marker() {
        assert_eq!(AccessTypeCategory::Read.marker(), "_READ");
        assert_eq!(AccessTypeCategory::Manage.as_str(), "MANAGE");
    }

    #[test]
    fn test_category_wire_name() {
        let category: AccessTypeCategory = serde_json::from_str("\"DELETE\"").unwrap();
        assert_eq!(category, AccessTypeCategory::Delete);
    }
}
