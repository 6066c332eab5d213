//! UBL Service Definition Engine
//!
//! Normalizes service definitions and derives capability information from
//! them. Compiles to both WASM (for Cloudflare Workers) and native.
//!
//! Provides the shared vocabulary every authorizer consults before
//! evaluating a policy: merged resource hierarchies for masking and row
//! filtering, marker access types with their expanded implied grants, leaf
//! resource lookup, and detection of policies that need a user-store
//! enricher.

pub mod bundle;
pub mod capability;
pub mod config;
pub mod enricher;
pub mod error;
pub mod hierarchy;
pub mod inspector;
pub mod merge;
pub mod normalize;
pub mod parser;
pub mod policy;
pub mod scanner;
pub mod service_def;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

#[cfg(test)]
mod properties;

pub use bundle::ServicePolicies;
pub use capability::{expanded_implied_grants, marker_access_types, with_marker_access_types};
pub use error::{Result, ServiceDefError};
pub use hierarchy::{is_ancestor_of, leaf_resource_def, leaf_resource_level};
pub use inspector::{ExpressionInspector, TokenInspector};
pub use normalize::{normalize, normalize_access_type_defs};
pub use policy::Policy;
pub use service_def::ServiceDef;

/// Version of the service definition engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::bundle::{PolicyDelta, SecurityZoneInfo, ServicePolicies, TagPolicies};
    pub use crate::capability::{expanded_implied_grants, marker_access_types};
    pub use crate::config::{EngineConfig, RetrieverSettings};
    pub use crate::enricher::add_user_store_enricher_if_needed;
    pub use crate::error::{Result, ServiceDefError};
    pub use crate::hierarchy::{is_ancestor_of, leaf_resource_def};
    pub use crate::inspector::{ExpressionInspector, TokenInspector};
    pub use crate::normalize::{normalize, normalize_access_type_defs};
    pub use crate::policy::{Policy, PolicyItem, PolicyItemCondition, PolicyResource};
    pub use crate::service_def::{AccessTypeDef, ResourceDef, ServiceDef};
    pub use crate::types::*;
}
