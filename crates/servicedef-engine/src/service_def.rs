//! Service definition model and lookups.

use crate::error::{Result, ServiceDefError};
use crate::types::{AccessTypeCategory, Options};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Declarative schema of one protected resource type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDef {
    #[serde(default)]
    pub id: Option<i64>,

    pub name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Service-level options, e.g. feature toggles.
    #[serde(default)]
    pub options: Options,

    /// The resource hierarchy.
    #[serde(default)]
    pub resources: Vec<ResourceDef>,

    #[serde(default)]
    pub access_types: Vec<AccessTypeDef>,

    /// Synthesized aggregate access types (`_READ`, `_ALL`, ...).
    #[serde(default)]
    pub marker_access_types: Vec<AccessTypeDef>,

    #[serde(default)]
    pub policy_conditions: Vec<PolicyConditionDef>,

    #[serde(default)]
    pub context_enrichers: Vec<ContextEnricherDef>,

    #[serde(default)]
    pub data_mask_def: Option<DataMaskDef>,

    #[serde(default)]
    pub row_filter_def: Option<RowFilterDef>,
}

/// One level of the resource hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDef {
    #[serde(default)]
    pub item_id: Option<i64>,

    pub name: String,

    #[serde(default, rename = "type")]
    pub resource_type: String,

    #[serde(default)]
    pub level: Option<i32>,

    /// Name of the parent resource, `None` for a root.
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub mandatory: Option<bool>,

    #[serde(default)]
    pub lookup_supported: Option<bool>,

    #[serde(default)]
    pub recursive_supported: Option<bool>,

    #[serde(default)]
    pub excludes_supported: Option<bool>,

    #[serde(default)]
    pub matcher: String,

    #[serde(default)]
    pub matcher_options: Options,

    #[serde(default)]
    pub validation_reg_ex: String,

    #[serde(default)]
    pub validation_message: String,

    #[serde(default)]
    pub ui_hint: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub rb_key_label: String,

    #[serde(default)]
    pub rb_key_description: String,

    #[serde(default)]
    pub rb_key_validation_message: String,

    /// Access types permitted on this resource, empty meaning all.
    #[serde(default)]
    pub access_type_restrictions: Vec<String>,

    #[serde(default)]
    pub is_valid_leaf: Option<bool>,
}

impl ResourceDef {
    /// Creates a resource definition at the given hierarchy level.
    pub fn new(name: impl Into<String>, level: i32) -> Self {
        Self {
            name: name.into(),
            level: Some(level),
            ..Default::default()
        }
    }

    /// Sets the parent resource.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the item id.
    pub fn with_item_id(mut self, item_id: i64) -> Self {
        self.item_id = Some(item_id);
        self
    }
}

/// A named permission grantable on resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTypeDef {
    #[serde(default)]
    pub item_id: Option<i64>,

    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub rb_key_label: String,

    #[serde(default)]
    pub category: Option<AccessTypeCategory>,

    /// Access types granted along with this one.
    #[serde(default)]
    pub implied_grants: BTreeSet<String>,
}

impl AccessTypeDef {
    /// Creates an access type with the given id and name.
    pub fn new(item_id: i64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            item_id: Some(item_id),
            label: name.clone(),
            name,
            ..Default::default()
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: AccessTypeCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Adds implied grants.
    pub fn with_implied_grants<I, S>(mut self, grants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implied_grants.extend(grants.into_iter().map(Into::into));
        self
    }
}

/// A condition type that policies may attach to items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConditionDef {
    #[serde(default)]
    pub item_id: Option<i64>,

    pub name: String,

    #[serde(default)]
    pub evaluator: String,

    #[serde(default)]
    pub evaluator_options: Options,

    #[serde(default)]
    pub validation_reg_ex: String,

    #[serde(default)]
    pub validation_message: String,

    #[serde(default)]
    pub ui_hint: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub description: String,
}

/// A pluggable component that adds request attributes before evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextEnricherDef {
    #[serde(default)]
    pub item_id: Option<i64>,

    pub name: String,

    /// Implementation selector.
    #[serde(default)]
    pub enricher: String,

    #[serde(default)]
    pub enricher_options: Options,
}

impl ContextEnricherDef {
    pub fn new(
        item_id: i64,
        name: impl Into<String>,
        enricher: impl Into<String>,
        enricher_options: Options,
    ) -> Self {
        Self {
            item_id: Some(item_id),
            name: name.into(),
            enricher: enricher.into(),
            enricher_options,
        }
    }
}

/// A masking transformation offered by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMaskTypeDef {
    #[serde(default)]
    pub item_id: Option<i64>,

    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub transformer: String,

    #[serde(default)]
    pub data_mask_options: Options,
}

/// Data-masking specialization of a service definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMaskDef {
    #[serde(default)]
    pub mask_types: Vec<DataMaskTypeDef>,

    #[serde(default)]
    pub access_types: Vec<AccessTypeDef>,

    #[serde(default)]
    pub resources: Vec<ResourceDef>,
}

/// Row-filtering specialization of a service definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFilterDef {
    #[serde(default)]
    pub access_types: Vec<AccessTypeDef>,

    #[serde(default)]
    pub resources: Vec<ResourceDef>,
}

impl ServiceDef {
    /// Creates an empty service definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a resource to the hierarchy.
    pub fn with_resource(mut self, resource: ResourceDef) -> Self {
        self.resources.push(resource);
        self
    }

    /// Adds an access type.
    pub fn with_access_type(mut self, access_type: AccessTypeDef) -> Self {
        self.access_types.push(access_type);
        self
    }

    /// Sets the data-mask specialization.
    pub fn with_data_mask_def(mut self, data_mask_def: DataMaskDef) -> Self {
        self.data_mask_def = Some(data_mask_def);
        self
    }

    /// Sets the row-filter specialization.
    pub fn with_row_filter_def(mut self, row_filter_def: RowFilterDef) -> Self {
        self.row_filter_def = Some(row_filter_def);
        self
    }

    /// Sets an option.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Looks up a resource by name, ignoring case.
    pub fn resource_def(&self, name: &str) -> Option<&ResourceDef> {
        self.resources
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Looks up an access type by exact name.
    pub fn access_type_def(&self, name: &str) -> Option<&AccessTypeDef> {
        self.access_types.iter().find(|a| a.name == name)
    }

    /// Looks up a policy condition by exact name.
    pub fn condition_def(&self, name: &str) -> Option<&PolicyConditionDef> {
        self.policy_conditions.iter().find(|c| c.name == name)
    }

    /// Looks up a data-mask type by exact name.
    pub fn data_mask_type(&self, name: &str) -> Option<&DataMaskTypeDef> {
        self.data_mask_def
            .as_ref()?
            .mask_types
            .iter()
            .find(|m| m.name == name)
    }

    /// Parses a service definition from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let service_def: ServiceDef = serde_yaml::from_str(yaml)?;
        service_def.validate()?;
        Ok(service_def)
    }

    /// Parses a service definition from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let service_def: ServiceDef = serde_json::from_str(json)?;
        service_def.validate()?;
        Ok(service_def)
    }

    /// Serializes the service definition to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ServiceDefError::SerializationError(e.to_string()))
    }

    /// Serializes the service definition to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ServiceDefError::SerializationError(e.to_string()))
    }

    /// Validates naming invariants: a non-empty name and unique resource and
    /// access-type names.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(ServiceDefError::ValidationError(
                "Service definition name is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if resource.name.is_empty() {
                return Err(ServiceDefError::ValidationError(format!(
                    "Resource name is required in service '{}'",
                    self.name
                )));
            }
            if !seen.insert(resource.name.as_str()) {
                return Err(ServiceDefError::ValidationError(format!(
                    "Duplicate resource '{}' in service '{}'",
                    resource.name, self.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for access_type in &self.access_types {
            if !seen.insert(access_type.name.as_str()) {
                return Err(ServiceDefError::ValidationError(format!(
                    "Duplicate access type '{}' in service '{}'",
                    access_type.name, self.name
                )));
            }
        }

        Ok(())
    }
}

/// Name of the implicit condition holding a free-form boolean expression.
pub const IMPLICIT_CONDITION_EXPRESSION_NAME: &str = "_expression";
pub const IMPLICIT_CONDITION_EXPRESSION_EVALUATOR: &str = "ScriptConditionEvaluator";
pub const IMPLICIT_CONDITION_EXPRESSION_LABEL: &str = "Enter boolean expression";
pub const IMPLICIT_CONDITION_EXPRESSION_DESC: &str = "Boolean expression";

/// Builds the implicit `_expression` condition definition.
pub fn create_implicit_expression_condition_def(item_id: i64) -> PolicyConditionDef {
    let mut evaluator_options = Options::new();
    evaluator_options.insert("engineName".to_string(), "JavaScript".to_string());
    evaluator_options.insert("ui.isMultiline".to_string(), "true".to_string());

    PolicyConditionDef {
        item_id: Some(item_id),
        name: IMPLICIT_CONDITION_EXPRESSION_NAME.to_string(),
        evaluator: IMPLICIT_CONDITION_EXPRESSION_EVALUATOR.to_string(),
        evaluator_options,
        ui_hint: "{ \"isMultiline\":true }".to_string(),
        label: IMPLICIT_CONDITION_EXPRESSION_LABEL.to_string(),
        description: IMPLICIT_CONDITION_EXPRESSION_DESC.to_string(),
        ..Default::default()
    }
}

/// Largest item id among the condition definitions, 0 when there are none.
pub fn conditions_max_item_id(conditions: &[PolicyConditionDef]) -> i64 {
    conditions
        .iter()
        .filter_map(|c| c.item_id)
        .fold(0, i64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_def_from_yaml() {
        let yaml = r#"
name: hive
resources:
  - name: database
    level: 10
    mandatory: true
  - name: table
    level: 20
    parent: database
accessTypes:
  - itemId: 1
    name: select
    category: READ
  - itemId: 2
    name: all
    impliedGrants: [select]
"#;

        let service_def = ServiceDef::from_yaml(yaml).unwrap();
        assert_eq!(service_def.name, "hive");
        assert_eq!(service_def.resources.len(), 2);
        assert_eq!(
            service_def.resources[1].parent.as_deref(),
            Some("database")
        );
        assert_eq!(
            service_def.access_type_def("select").unwrap().category,
            Some(AccessTypeCategory::Read)
        );
        assert!(service_def.data_mask_def.is_none());
    }

    #[test]
    fn test_duplicate_access_type_rejected() {
        let json = r#"{"name": "hdfs", "accessTypes": [{"name": "read"}, {"name": "read"}]}"#;
        let err = ServiceDef::from_json(json).unwrap_err();
        assert!(matches!(err, ServiceDefError::ValidationError(_)));
    }

    #[test]
    fn test_resource_lookup_ignores_case() {
        let service_def = ServiceDef::new("hive").with_resource(ResourceDef::new("Database", 1));
        assert!(service_def.resource_def("database").is_some());
        assert!(service_def.resource_def("table").is_none());
    }

    #[test]
    fn test_lookups_on_empty_definition() {
        let service_def = ServiceDef::new("empty");
        assert!(service_def.condition_def("ip-range").is_none());
        assert!(service_def.data_mask_type("MASK").is_none());
        assert!(service_def.access_type_def("read").is_none());
    }

    #[test]
    fn test_conditions_max_item_id() {
        assert_eq!(conditions_max_item_id(&[]), 0);

        let conditions = vec![
            PolicyConditionDef {
                item_id: Some(3),
                name: "ip-range".to_string(),
                ..Default::default()
            },
            PolicyConditionDef {
                item_id: None,
                name: "expr".to_string(),
                ..Default::default()
            },
            PolicyConditionDef {
                item_id: Some(7),
                name: "tz".to_string(),
                ..Default::default()
            },
        ];
        assert_eq!(conditions_max_item_id(&conditions), 7);
    }

    #[test]
    fn test_implicit_expression_condition() {
        let mut service_def = ServiceDef::new("hive");
        let next_id = conditions_max_item_id(&service_def.policy_conditions) + 1;
        service_def
            .policy_conditions
            .push(create_implicit_expression_condition_def(next_id));

        let condition = service_def.condition_def("_expression").unwrap();
        assert_eq!(condition.item_id, Some(1));
        assert_eq!(condition.evaluator_options["engineName"], "JavaScript");
        assert_eq!(condition.label, IMPLICIT_CONDITION_EXPRESSION_LABEL);
    }
}
