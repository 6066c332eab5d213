//! Scan of published policies for dynamic user/group attribute references.
//!
//! A service needs a user-store enricher only when some policy resolves user or
//! group attributes at request time. The scan stops at the first hit.

use crate::bundle::{PolicyDelta, ServicePolicies};
use crate::inspector::ExpressionInspector;
use crate::policy::{Policy, PolicyItemCondition, PolicyItemRef};
use tracing::debug;

/// Returns true if any policy of the bundle references a user/group attribute.
///
/// Checks, in order: the service's policies, the tag-service policies, the
/// policies carried by deltas, then each security zone's policies and deltas.
pub fn needs_user_group_enricher<I>(policies: &ServicePolicies, inspector: &I) -> bool
where
    I: ExpressionInspector + ?Sized,
{
    let service = policies.service_name.as_str();

    if any_policy_has_reference(service, &policies.policies, inspector) {
        return true;
    }

    if let Some(tag_policies) = &policies.tag_policies {
        if any_policy_has_reference(service, &tag_policies.policies, inspector) {
            return true;
        }
    }

    if any_delta_has_reference(service, &policies.policy_deltas, inspector) {
        return true;
    }

    policies.security_zones.values().any(|zone| {
        any_policy_has_reference(service, &zone.policies, inspector)
            || any_delta_has_reference(service, &zone.policy_deltas, inspector)
    })
}

/// Returns true if the policy references a user/group attribute in a resource
/// value, a condition, or any of its items.
pub fn policy_has_user_group_attribute_reference<I>(policy: &Policy, inspector: &I) -> bool
where
    I: ExpressionInspector + ?Sized,
{
    policy
        .resources
        .values()
        .any(|resource| inspector.has_user_group_attribute_in_expressions(&resource.values))
        || any_condition_has_reference(&policy.conditions, inspector)
        || policy.items().any(|item| item_has_reference(item, inspector))
}

fn any_policy_has_reference<I>(service: &str, policies: &[Policy], inspector: &I) -> bool
where
    I: ExpressionInspector + ?Sized,
{
    match policies
        .iter()
        .find(|policy| policy_has_user_group_attribute_reference(policy, inspector))
    {
        Some(policy) => {
            log_reference(service, policy);
            true
        }
        None => false,
    }
}

fn any_delta_has_reference<I>(service: &str, deltas: &[PolicyDelta], inspector: &I) -> bool
where
    I: ExpressionInspector + ?Sized,
{
    let policies = deltas.iter().filter_map(|delta| delta.policy.as_ref());

    for policy in policies {
        if policy_has_user_group_attribute_reference(policy, inspector) {
            log_reference(service, policy);
            return true;
        }
    }

    false
}

fn item_has_reference<I>(item: PolicyItemRef<'_>, inspector: &I) -> bool
where
    I: ExpressionInspector + ?Sized,
{
    if any_condition_has_reference(item.conditions(), inspector) {
        return true;
    }

    match item {
        PolicyItemRef::Allow(_)
        | PolicyItemRef::Deny(_)
        | PolicyItemRef::AllowException(_)
        | PolicyItemRef::DenyException(_) => false,
        PolicyItemRef::DataMask(mask) => mask.data_mask_info.as_ref().is_some_and(|info| {
            [&info.value_expr, &info.condition_expr]
                .into_iter()
                .flatten()
                .any(|expr| inspector.has_user_group_attribute_in_expression(expr))
        }),
        PolicyItemRef::RowFilter(filter) => filter
            .row_filter_info
            .as_ref()
            .is_some_and(|info| inspector.has_user_group_attribute_in_expression(&info.filter_expr)),
    }
}

fn any_condition_has_reference<I>(conditions: &[PolicyItemCondition], inspector: &I) -> bool
where
    I: ExpressionInspector + ?Sized,
{
    conditions
        .iter()
        .any(|condition| inspector.has_user_group_attribute_reference(&condition.values))
}

fn log_reference(service: &str, policy: &Policy) {
    debug!(
        service,
        policy_id = ?policy.id,
        policy_name = %policy.name,
        "policy references a user/group attribute"
    );
}
