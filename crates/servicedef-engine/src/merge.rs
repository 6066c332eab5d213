//! Field-level merge of specialized definitions onto their base definitions.
//!
//! A specialization (the data-mask or row-filter view of a service) may refine
//! how a resource or access type behaves but never restructures the hierarchy:
//! identity and topology fields always keep the base value.

use crate::service_def::{AccessTypeDef, ResourceDef};

/// Merges `delta` onto `base`, returning a new resource definition.
///
/// Retains the base item id, name, type, level, parent and lookup flag.
pub fn merge_resource_def(base: &ResourceDef, delta: &ResourceDef) -> ResourceDef {
    let mut ret = base.clone();

    // Can only add a requirement.
    if delta.mandatory == Some(true) {
        ret.mandatory = Some(true);
    }

    if delta.recursive_supported.is_some() {
        ret.recursive_supported = delta.recursive_supported;
    }

    if delta.excludes_supported.is_some() {
        ret.excludes_supported = delta.excludes_supported;
    }

    override_if_set(&mut ret.matcher, &delta.matcher);

    for (key, value) in &delta.matcher_options {
        ret.matcher_options.insert(key.clone(), value.clone());
    }

    override_if_set(&mut ret.validation_reg_ex, &delta.validation_reg_ex);
    override_if_set(&mut ret.validation_message, &delta.validation_message);

    ret.ui_hint = delta.ui_hint.clone();

    override_if_set(&mut ret.label, &delta.label);
    override_if_set(&mut ret.description, &delta.description);
    override_if_set(&mut ret.rb_key_label, &delta.rb_key_label);
    override_if_set(&mut ret.rb_key_description, &delta.rb_key_description);
    override_if_set(
        &mut ret.rb_key_validation_message,
        &delta.rb_key_validation_message,
    );

    if !delta.access_type_restrictions.is_empty() {
        ret.access_type_restrictions = delta.access_type_restrictions.clone();
    }

    if ret.is_valid_leaf != delta.is_valid_leaf {
        ret.is_valid_leaf = delta.is_valid_leaf;
    }

    ret
}

/// Merges `delta` onto `base`, returning a new access type definition.
///
/// Retains the base item id, name, category and implied grants.
pub fn merge_access_type_def(base: &AccessTypeDef, delta: &AccessTypeDef) -> AccessTypeDef {
    let mut ret = base.clone();

    override_if_set(&mut ret.label, &delta.label);
    override_if_set(&mut ret.rb_key_label, &delta.rb_key_label);

    ret
}

fn override_if_set(target: &mut String, value: &str) {
    if !value.is_empty() {
        *target = value.to_string();
    }
}
