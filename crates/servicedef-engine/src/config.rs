//! Option lookups and process-wide engine configuration.

use crate::error::Result;
use crate::service_def::ServiceDef;
use crate::types::Options;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Service option enabling deny items and exceptions in policies.
pub const OPTION_ENABLE_DENY_AND_EXCEPTIONS_IN_POLICIES: &str = "enableDenyAndExceptionsInPolicies";

/// Service option enabling tag-based policies.
pub const OPTION_ENABLE_TAG_BASED_POLICIES: &str = "enableTagBasedPolicies";

/// Configuration key supplying the default for deny/exception support.
pub const CONFIG_ENABLE_DENY_AND_EXCEPTIONS_IN_POLICIES: &str =
    "servicedef.enableDenyAndExceptionsInPolicies";

/// Configuration key supplying the default for tag-based policy support.
pub const CONFIG_ENABLE_TAG_BASED_POLICIES: &str = "servicedef.enableTagBasedPolicies";

/// Name of the tag service definition.
pub const TAG_SERVICE_DEF_NAME: &str = "tag";

/// Returns the option value, or `default` when absent.
pub fn get_option<'a>(options: &'a Options, name: &str, default: &'a str) -> &'a str {
    options.get(name).map(String::as_str).unwrap_or(default)
}

/// Returns the option parsed as a boolean, or `default` when absent.
///
/// Any present value other than `true` (ignoring case) reads as `false`.
pub fn get_boolean_option(options: &Options, name: &str, default: bool) -> bool {
    match options.get(name) {
        Some(value) => parse_bool(value),
        None => default,
    }
}

/// Returns the first character of the option, or `default` when absent or empty.
pub fn get_char_option(options: &Options, name: &str, default: char) -> char {
    options
        .get(name)
        .and_then(|value| value.chars().next())
        .unwrap_or(default)
}

/// Returns the option parsed as a boolean, or `default` when absent or empty.
pub fn get_boolean_value(options: &Options, name: &str, default: bool) -> bool {
    match options.get(name) {
        Some(value) if !value.is_empty() => parse_bool(value),
        _ => default,
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Process-wide configuration properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns the property parsed as a boolean, or `default` when absent or empty.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        get_boolean_value(&self.properties, key, default)
    }

    /// Parses configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where an enricher fetches its data from and how often it refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieverSettings {
    pub retriever_class_name: String,

    #[serde(default = "default_polling_interval_ms")]
    pub polling_interval_ms: u64,
}

fn default_polling_interval_ms() -> u64 {
    60_000
}

impl RetrieverSettings {
    pub fn new(retriever_class_name: impl Into<String>, polling_interval_ms: u64) -> Self {
        Self {
            retriever_class_name: retriever_class_name.into(),
            polling_interval_ms,
        }
    }
}

/// Whether policies of this service may carry deny items and exceptions.
///
/// The service option wins; otherwise the configured default applies, and the
/// tag service always defaults to enabled.
pub fn enable_deny_and_exceptions_in_policies(
    service_def: &ServiceDef,
    config: Option<&EngineConfig>,
) -> bool {
    let configured = config
        .map(|c| c.get_bool(CONFIG_ENABLE_DENY_AND_EXCEPTIONS_IN_POLICIES, true))
        .unwrap_or(true);
    let default = configured || service_def.name.eq_ignore_ascii_case(TAG_SERVICE_DEF_NAME);

    get_boolean_value(
        &service_def.options,
        OPTION_ENABLE_DENY_AND_EXCEPTIONS_IN_POLICIES,
        default,
    )
}

/// Whether tag-based policies apply to this service.
pub fn enable_tag_based_policies(service_def: &ServiceDef, config: Option<&EngineConfig>) -> bool {
    let default = config
        .map(|c| c.get_bool(CONFIG_ENABLE_TAG_BASED_POLICIES, true))
        .unwrap_or(true);

    get_boolean_value(&service_def.options, OPTION_ENABLE_TAG_BASED_POLICIES, default)
}
