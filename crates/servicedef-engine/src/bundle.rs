//! Policy bundles published for one service.

use crate::error::Result;
use crate::policy::Policy;
use crate::service_def::ServiceDef;
use crate::types::PolicyChangeType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An incremental change to one policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDelta {
    #[serde(default)]
    pub id: Option<i64>,

    #[serde(default)]
    pub change_type: PolicyChangeType,

    #[serde(default)]
    pub policy: Option<Policy>,
}

impl PolicyDelta {
    pub fn new(change_type: PolicyChangeType, policy: Policy) -> Self {
        Self {
            id: None,
            change_type,
            policy: Some(policy),
        }
    }
}

/// Policies of the tag service linked to a resource service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPolicies {
    #[serde(default)]
    pub service_name: String,

    #[serde(default)]
    pub service_def: Option<ServiceDef>,

    #[serde(default)]
    pub policies: Vec<Policy>,
}

/// Policies administered within one security zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityZoneInfo {
    #[serde(default)]
    pub zone_name: String,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(default)]
    pub policy_deltas: Vec<PolicyDelta>,
}

/// Everything published to the policy engine for one service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePolicies {
    #[serde(default)]
    pub service_name: String,

    #[serde(default)]
    pub service_def: Option<ServiceDef>,

    #[serde(default)]
    pub policies: Vec<Policy>,

    #[serde(default)]
    pub tag_policies: Option<TagPolicies>,

    #[serde(default)]
    pub security_zones: HashMap<String, SecurityZoneInfo>,

    #[serde(default)]
    pub policy_deltas: Vec<PolicyDelta>,
}

impl ServicePolicies {
    /// Creates a bundle for a service definition.
    pub fn new(service_name: impl Into<String>, service_def: ServiceDef) -> Self {
        Self {
            service_name: service_name.into(),
            service_def: Some(service_def),
            ..Default::default()
        }
    }

    /// Adds a policy.
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Sets the tag-service policies.
    pub fn with_tag_policies(mut self, tag_policies: TagPolicies) -> Self {
        self.tag_policies = Some(tag_policies);
        self
    }

    /// Adds a policy delta.
    pub fn with_policy_delta(mut self, delta: PolicyDelta) -> Self {
        self.policy_deltas.push(delta);
        self
    }

    /// Adds a security zone.
    pub fn with_security_zone(mut self, zone: SecurityZoneInfo) -> Self {
        self.security_zones.insert(zone.zone_name.clone(), zone);
        self
    }

    /// Parses a bundle from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a bundle from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes the bundle to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
