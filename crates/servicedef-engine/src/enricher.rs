//! Attachment of context enrichers to a published service definition.
//!
//! Each operation consumes the bundle and hands it back together with whether
//! an enricher was added.

use crate::bundle::ServicePolicies;
use crate::config::RetrieverSettings;
use crate::inspector::ExpressionInspector;
use crate::scanner::needs_user_group_enricher;
use crate::service_def::ContextEnricherDef;
use crate::types::Options;
use tracing::{debug, info};

/// Enricher resolving user and group attributes.
pub const USER_STORE_ENRICHER: &str = "UserStoreEnricher";
pub const USER_STORE_ENRICHER_NAME: &str = "userStoreEnricher";
pub const USER_STORE_RETRIEVER_CLASSNAME_OPTION: &str = "userStoreRetrieverClassName";
pub const USER_STORE_REFRESHER_POLLINGINTERVAL_OPTION: &str = "userStoreRefresherPollingInterval";

/// Enricher resolving governed-data sharing information.
pub const GDS_INFO_ENRICHER: &str = "GdsEnricher";
pub const GDS_INFO_ENRICHER_NAME: &str = "gdsInfoEnricher";
pub const RETRIEVER_CLASSNAME_OPTION: &str = "retrieverClassName";
pub const REFRESHER_POLLINGINTERVAL_OPTION: &str = "refresherPollingInterval";

struct EnricherKind {
    name: &'static str,
    enricher: &'static str,
    retriever_option: &'static str,
    interval_option: &'static str,
}

const USER_STORE: EnricherKind = EnricherKind {
    name: USER_STORE_ENRICHER_NAME,
    enricher: USER_STORE_ENRICHER,
    retriever_option: USER_STORE_RETRIEVER_CLASSNAME_OPTION,
    interval_option: USER_STORE_REFRESHER_POLLINGINTERVAL_OPTION,
};

const GDS_INFO: EnricherKind = EnricherKind {
    name: GDS_INFO_ENRICHER_NAME,
    enricher: GDS_INFO_ENRICHER,
    retriever_option: RETRIEVER_CLASSNAME_OPTION,
    interval_option: REFRESHER_POLLINGINTERVAL_OPTION,
};

/// Returns true if the bundle's service definition has a user-store enricher.
pub fn is_user_store_enricher_present(policies: &ServicePolicies) -> bool {
    is_enricher_present(policies, &USER_STORE)
}

/// Returns true if the bundle's service definition has a GDS info enricher.
pub fn is_gds_info_enricher_present(policies: &ServicePolicies) -> bool {
    is_enricher_present(policies, &GDS_INFO)
}

/// Appends a user-store enricher unless one is already present.
pub fn add_user_store_enricher(
    policies: ServicePolicies,
    settings: &RetrieverSettings,
) -> (ServicePolicies, bool) {
    add_enricher(policies, &USER_STORE, settings)
}

/// Appends a GDS info enricher unless one is already present.
pub fn add_gds_info_enricher(
    policies: ServicePolicies,
    settings: &RetrieverSettings,
) -> (ServicePolicies, bool) {
    add_enricher(policies, &GDS_INFO, settings)
}

/// Appends a user-store enricher when some policy of the bundle references a
/// user/group attribute and the service does not have one yet.
pub fn add_user_store_enricher_if_needed<I>(
    policies: ServicePolicies,
    settings: &RetrieverSettings,
    inspector: &I,
) -> (ServicePolicies, bool)
where
    I: ExpressionInspector + ?Sized,
{
    if policies.service_def.is_none() || is_user_store_enricher_present(&policies) {
        return (policies, false);
    }

    if !needs_user_group_enricher(&policies, inspector) {
        return (policies, false);
    }

    add_user_store_enricher(policies, settings)
}

fn is_enricher_present(policies: &ServicePolicies, kind: &EnricherKind) -> bool {
    let ret = policies.service_def.as_ref().is_some_and(|service_def| {
        service_def
            .context_enrichers
            .iter()
            .any(|e| e.enricher == kind.enricher)
    });

    debug!(service = %policies.service_name, enricher = kind.enricher, present = ret, "checked enricher");

    ret
}

fn add_enricher(
    mut policies: ServicePolicies,
    kind: &EnricherKind,
    settings: &RetrieverSettings,
) -> (ServicePolicies, bool) {
    if is_enricher_present(&policies, kind) {
        return (policies, false);
    }

    let Some(service_def) = policies.service_def.as_mut() else {
        return (policies, false);
    };

    let item_id = next_item_id(&service_def.context_enrichers);

    let mut options = Options::new();
    options.insert(
        kind.retriever_option.to_string(),
        settings.retriever_class_name.clone(),
    );
    options.insert(
        kind.interval_option.to_string(),
        settings.polling_interval_ms.to_string(),
    );

    service_def
        .context_enrichers
        .push(ContextEnricherDef::new(item_id, kind.name, kind.enricher, options));

    info!(
        service = %policies.service_name,
        enricher = kind.name,
        item_id,
        "added context enricher"
    );

    (policies, true)
}

/// At least one past the list length and one past the largest existing id,
/// saturating at `i64::MAX`.
fn next_item_id(enrichers: &[ContextEnricherDef]) -> i64 {
    let after_len = i64::try_from(enrichers.len())
        .unwrap_or(i64::MAX)
        .saturating_add(1);

    enrichers
        .iter()
        .filter_map(|e| e.item_id)
        .fold(after_len, |next, id| next.max(id.saturating_add(1)))
}
