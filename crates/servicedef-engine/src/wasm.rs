//! WASM bindings for the service definition engine.
//!
//! Documents cross the boundary as JSON strings.

#![cfg(feature = "wasm")]

use crate::bundle::ServicePolicies;
use crate::config::RetrieverSettings;
use crate::inspector::TokenInspector;
use crate::service_def::{AccessTypeDef, ServiceDef};
use wasm_bindgen::prelude::*;

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn parse_service_def(json: &str) -> Result<ServiceDef, JsValue> {
    ServiceDef::from_json(json).map_err(to_js)
}

/// WASM-compatible wrapper around a loaded service definition.
#[wasm_bindgen]
pub struct WasmServiceDef {
    service_def: ServiceDef,
}

#[wasm_bindgen]
impl WasmServiceDef {
    /// Loads a service definition from a JSON string.
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str) -> Result<WasmServiceDef, JsValue> {
        Ok(Self {
            service_def: parse_service_def(json)?,
        })
    }

    /// Loads a service definition from a YAML string.
    #[wasm_bindgen]
    pub fn from_yaml(yaml: &str) -> Result<WasmServiceDef, JsValue> {
        Ok(Self {
            service_def: ServiceDef::from_yaml(yaml).map_err(to_js)?,
        })
    }

    /// Merges the data-mask and row-filter specializations onto their base entries.
    #[wasm_bindgen]
    pub fn normalize(&mut self) {
        self.service_def = crate::normalize::normalize(std::mem::take(&mut self.service_def));
    }

    /// Strips the component prefix from every access-type list.
    #[wasm_bindgen]
    pub fn normalize_access_type_defs(&mut self, component_type: &str) {
        self.service_def = crate::normalize::normalize_access_type_defs(
            std::mem::take(&mut self.service_def),
            component_type,
        );
    }

    /// Derives the marker access types from the current access types.
    #[wasm_bindgen]
    pub fn derive_marker_access_types(&mut self) {
        self.service_def =
            crate::capability::with_marker_access_types(std::mem::take(&mut self.service_def));
    }

    /// Returns the expanded implied grants as a JSON object.
    #[wasm_bindgen]
    pub fn expanded_implied_grants(&self) -> Result<String, JsValue> {
        let grants = crate::capability::expanded_implied_grants(&self.service_def);
        serde_json::to_string(&grants).map_err(to_js)
    }

    /// Returns true if `ancestor` is a strict ancestor of `descendant`.
    #[wasm_bindgen]
    pub fn is_ancestor_of(&self, ancestor: &str, descendant: &str) -> bool {
        match (
            self.service_def.resource_def(ancestor),
            self.service_def.resource_def(descendant),
        ) {
            (Some(a), Some(d)) => crate::hierarchy::is_ancestor_of(&self.service_def, a, d),
            _ => false,
        }
    }

    /// Returns the service definition as a JSON string.
    #[wasm_bindgen]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.service_def.to_json().map_err(to_js)
    }
}

/// Normalizes a service definition given as JSON.
#[wasm_bindgen]
pub fn normalize_service_def(json: &str) -> Result<String, JsValue> {
    let service_def = crate::normalize::normalize(parse_service_def(json)?);
    service_def.to_json().map_err(to_js)
}

/// Computes the marker access types for a JSON array of access-type definitions.
#[wasm_bindgen]
pub fn marker_access_types(access_types_json: &str) -> Result<String, JsValue> {
    let access_types: Vec<AccessTypeDef> = serde_json::from_str(access_types_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid access types: {}", e)))?;

    serde_json::to_string(&crate::capability::marker_access_types(&access_types)).map_err(to_js)
}

/// Returns true if any policy of the JSON bundle references a user/group attribute.
#[wasm_bindgen]
pub fn needs_user_group_enricher(policies_json: &str) -> Result<bool, JsValue> {
    let policies = ServicePolicies::from_json(policies_json).map_err(to_js)?;
    let inspector = TokenInspector::new().map_err(to_js)?;

    Ok(crate::scanner::needs_user_group_enricher(&policies, &inspector))
}

/// Adds a user-store enricher to the JSON bundle when its policies need one.
/// Returns the bundle as JSON.
#[wasm_bindgen]
pub fn add_user_store_enricher_if_needed(
    policies_json: &str,
    retriever_class_name: &str,
    polling_interval_ms: u64,
) -> Result<String, JsValue> {
    let policies = ServicePolicies::from_json(policies_json).map_err(to_js)?;
    let inspector = TokenInspector::new().map_err(to_js)?;
    let settings = RetrieverSettings::new(retriever_class_name, polling_interval_ms);

    let (policies, _) =
        crate::enricher::add_user_store_enricher_if_needed(policies, &settings, &inspector);

    policies.to_json().map_err(to_js)
}

/// Logs a message to the console (for debugging).
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Returns the version of the service definition engine.
#[wasm_bindgen]
pub fn version() -> String {
    crate::VERSION.to_string()
}
