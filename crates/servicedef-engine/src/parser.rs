//! Service definition and policy bundle document parser.

use crate::bundle::ServicePolicies;
use crate::error::Result;
use crate::service_def::ServiceDef;
use serde::Deserialize;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Detects format from file extension.
    pub fn from_extension(path: &str) -> Option<Self> {
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            Some(DocumentFormat::Yaml)
        } else if path.ends_with(".json") {
            Some(DocumentFormat::Json)
        } else {
            None
        }
    }

    /// Detects format from content.
    pub fn detect(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            DocumentFormat::Json
        } else {
            DocumentFormat::Yaml
        }
    }
}

/// Parses a service definition, auto-detecting format.
pub fn parse_service_def(content: &str) -> Result<ServiceDef> {
    parse_service_def_with_format(content, DocumentFormat::detect(content))
}

/// Parses a service definition with the specified format.
pub fn parse_service_def_with_format(content: &str, format: DocumentFormat) -> Result<ServiceDef> {
    match format {
        DocumentFormat::Yaml => ServiceDef::from_yaml(content),
        DocumentFormat::Json => ServiceDef::from_json(content),
    }
}

/// Parses every service definition of a multi-document YAML stream.
pub fn parse_service_defs_yaml(content: &str) -> Result<Vec<ServiceDef>> {
    let mut service_defs = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }

        let service_def: ServiceDef = serde_yaml::from_value(value)?;
        service_def.validate()?;
        service_defs.push(service_def);
    }

    Ok(service_defs)
}

/// Parses a policy bundle, auto-detecting format.
pub fn parse_service_policies(content: &str) -> Result<ServicePolicies> {
    match DocumentFormat::detect(content) {
        DocumentFormat::Yaml => ServicePolicies::from_yaml(content),
        DocumentFormat::Json => ServicePolicies::from_json(content),
    }
}
