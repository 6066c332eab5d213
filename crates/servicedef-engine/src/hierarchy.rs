//! Queries over a service definition's resource hierarchy.

use crate::policy::PolicyResource;
use crate::service_def::{ResourceDef, ServiceDef};

/// Returns the deepest resource definition named by a policy.
///
/// Only resources with at least one non-blank value and a defined level are
/// considered. When two resources share the deepest level, the first one
/// yielded by `policy_resources` wins.
pub fn leaf_resource_def<'a, 'r, K, I>(
    service_def: &'a ServiceDef,
    policy_resources: I,
) -> Option<&'a ResourceDef>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, &'r PolicyResource)>,
{
    let mut ret: Option<(&ResourceDef, i32)> = None;

    for (name, resource) in policy_resources {
        if is_empty_resource(resource) {
            continue;
        }

        let Some(resource_def) = service_def.resource_def(name.as_ref()) else {
            continue;
        };
        let Some(level) = resource_def.level else {
            continue;
        };

        match ret {
            Some((_, deepest)) if deepest >= level => {}
            _ => ret = Some((resource_def, level)),
        }
    }

    ret.map(|(resource_def, _)| resource_def)
}

/// Level of the resource returned by [`leaf_resource_def`].
pub fn leaf_resource_level<'r, K, I>(service_def: &ServiceDef, policy_resources: I) -> Option<i32>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, &'r PolicyResource)>,
{
    leaf_resource_def(service_def, policy_resources).and_then(|r| r.level)
}

/// Returns true if `ancestor` appears on the parent chain of `descendant`.
///
/// Names compare case-insensitively. A parent that does not resolve, or a
/// chain that loops back on itself, ends the walk with `false`.
pub fn is_ancestor_of(service_def: &ServiceDef, ancestor: &ResourceDef, descendant: &ResourceDef) -> bool {
    let mut node = descendant;

    // A well-formed chain is never longer than the hierarchy.
    for _ in 0..=service_def.resources.len() {
        let Some(parent) = node.parent.as_deref() else {
            return false;
        };

        if parent.eq_ignore_ascii_case(&ancestor.name) {
            return true;
        }

        match service_def.resource_def(parent) {
            Some(next) => node = next,
            None => return false,
        }
    }

    false
}

/// Returns true if the resource has no non-blank value.
pub fn is_empty_resource(resource: &PolicyResource) -> bool {
    resource.values.iter().all(|v| v.trim().is_empty())
}
