//! Read-only view of policies as published by the policy store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values a policy matches for one resource level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResource {
    #[serde(default)]
    pub values: Vec<String>,

    #[serde(default)]
    pub is_excludes: bool,

    #[serde(default)]
    pub is_recursive: bool,
}

impl PolicyResource {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// A condition attached to a policy or a policy item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyItemCondition {
    #[serde(rename = "type")]
    pub condition_type: String,

    #[serde(default)]
    pub values: Vec<String>,
}

impl PolicyItemCondition {
    pub fn new<I, S>(condition_type: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            condition_type: condition_type.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// An access granted (or denied) by a policy item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyItemAccess {
    #[serde(rename = "type")]
    pub access_type: String,

    #[serde(default = "default_allowed")]
    pub is_allowed: bool,
}

fn default_allowed() -> bool {
    true
}

/// Principals, accesses and conditions of one allow/deny/exception entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyItem {
    #[serde(default)]
    pub accesses: Vec<PolicyItemAccess>,

    #[serde(default)]
    pub users: Vec<String>,

    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub conditions: Vec<PolicyItemCondition>,

    #[serde(default)]
    pub delegate_admin: bool,
}

impl PolicyItem {
    /// Adds a condition.
    pub fn with_condition(mut self, condition: PolicyItemCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds a group principal.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMaskInfo {
    #[serde(default)]
    pub data_mask_type: String,

    #[serde(default)]
    pub condition_expr: Option<String>,

    #[serde(default)]
    pub value_expr: Option<String>,
}

/// A policy item that masks column values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataMaskPolicyItem {
    #[serde(flatten)]
    pub item: PolicyItem,

    #[serde(default)]
    pub data_mask_info: Option<DataMaskInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFilterInfo {
    #[serde(default)]
    pub filter_expr: String,
}

/// A policy item that restricts visible rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowFilterPolicyItem {
    #[serde(flatten)]
    pub item: PolicyItem,

    #[serde(default)]
    pub row_filter_info: Option<RowFilterInfo>,
}

/// Borrowed view of any policy item kind.
#[derive(Debug, Clone, Copy)]
pub enum PolicyItemRef<'a> {
    Allow(&'a PolicyItem),
    Deny(&'a PolicyItem),
    AllowException(&'a PolicyItem),
    DenyException(&'a PolicyItem),
    DataMask(&'a DataMaskPolicyItem),
    RowFilter(&'a RowFilterPolicyItem),
}

impl<'a> PolicyItemRef<'a> {
    /// The common item fields, whatever the kind.
    pub fn item(&self) -> &'a PolicyItem {
        match *self {
            PolicyItemRef::Allow(item)
            | PolicyItemRef::Deny(item)
            | PolicyItemRef::AllowException(item)
            | PolicyItemRef::DenyException(item) => item,
            PolicyItemRef::DataMask(mask) => &mask.item,
            PolicyItemRef::RowFilter(filter) => &filter.item,
        }
    }

    pub fn conditions(&self) -> &'a [PolicyItemCondition] {
        &self.item().conditions
    }
}

/// A policy, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub service: String,

    #[serde(default)]
    pub resources: BTreeMap<String, PolicyResource>,

    #[serde(default)]
    pub conditions: Vec<PolicyItemCondition>,

    #[serde(default)]
    pub policy_items: Vec<PolicyItem>,

    #[serde(default)]
    pub deny_policy_items: Vec<PolicyItem>,

    #[serde(default)]
    pub allow_exceptions: Vec<PolicyItem>,

    #[serde(default)]
    pub deny_exceptions: Vec<PolicyItem>,

    #[serde(default)]
    pub data_mask_policy_items: Vec<DataMaskPolicyItem>,

    #[serde(default)]
    pub row_filter_policy_items: Vec<RowFilterPolicyItem>,
}

impl Policy {
    /// Creates an empty policy.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a resource with its values.
    pub fn with_resource(mut self, name: impl Into<String>, resource: PolicyResource) -> Self {
        self.resources.insert(name.into(), resource);
        self
    }

    /// Adds a policy-level condition.
    pub fn with_condition(mut self, condition: PolicyItemCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds an allow item.
    pub fn with_allow_item(mut self, item: PolicyItem) -> Self {
        self.policy_items.push(item);
        self
    }

    /// Adds a deny item.
    pub fn with_deny_item(mut self, item: PolicyItem) -> Self {
        self.deny_policy_items.push(item);
        self
    }

    /// Adds a data-mask item.
    pub fn with_data_mask_item(mut self, item: DataMaskPolicyItem) -> Self {
        self.data_mask_policy_items.push(item);
        self
    }

    /// Adds a row-filter item.
    pub fn with_row_filter_item(mut self, item: RowFilterPolicyItem) -> Self {
        self.row_filter_policy_items.push(item);
        self
    }

    /// Every item of the policy: allow, deny, allow exceptions, deny exceptions,
    /// data-mask, then row-filter items.
    pub fn items(&self) -> impl Iterator<Item = PolicyItemRef<'_>> {
        self.policy_items
            .iter()
            .map(PolicyItemRef::Allow)
            .chain(self.deny_policy_items.iter().map(PolicyItemRef::Deny))
            .chain(self.allow_exceptions.iter().map(PolicyItemRef::AllowException))
            .chain(self.deny_exceptions.iter().map(PolicyItemRef::DenyException))
            .chain(self.data_mask_policy_items.iter().map(PolicyItemRef::DataMask))
            .chain(self.row_filter_policy_items.iter().map(PolicyItemRef::RowFilter))
    }
}
