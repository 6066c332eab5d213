//! Detection of dynamic user/group attribute references in policy text.
//!
//! Expressions are never evaluated here; the inspector only answers whether a
//! string mentions an attribute that must be resolved per request.

use crate::error::{Result, ServiceDefError};
use regex::Regex;

/// Script tokens that resolve user or group attributes of the requesting principal.
pub const DEFAULT_ATTRIBUTE_TOKENS: &[&str] = &[
    "USER",
    "UGA",
    "UG",
    "UGNAMES",
    "GET_UG_ATTR",
    "GET_USER_ATTR",
    "HAS_UG_ATTR",
    "HAS_USER_ATTR",
];

/// Answers whether policy text references a dynamic user/group attribute.
pub trait ExpressionInspector {
    /// Checks a templated expression such as a resource value or a mask/filter
    /// expression, where references appear inside `${{ ... }}`.
    fn has_user_group_attribute_in_expression(&self, expr: &str) -> bool;

    /// Checks the values of a script condition.
    fn has_user_group_attribute_reference(&self, values: &[String]) -> bool;

    /// Checks several templated expressions.
    fn has_user_group_attribute_in_expressions(&self, exprs: &[String]) -> bool {
        exprs
            .iter()
            .any(|expr| self.has_user_group_attribute_in_expression(expr))
    }
}

/// Token-matching inspector.
#[derive(Debug, Clone)]
pub struct TokenInspector {
    template: Regex,
    reference: Regex,
}

impl TokenInspector {
    /// Creates an inspector for [`DEFAULT_ATTRIBUTE_TOKENS`].
    pub fn new() -> Result<Self> {
        Self::with_tokens(DEFAULT_ATTRIBUTE_TOKENS)
    }

    /// Creates an inspector for a custom token list. Tokens must be non-empty
    /// identifiers and match as whole words.
    pub fn with_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        if tokens.is_empty() {
            return Err(ServiceDefError::InvalidPattern(
                "at least one attribute token is required".to_string(),
            ));
        }

        let mut alternatives = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref();
            if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ServiceDefError::InvalidPattern(format!(
                    "attribute token '{}' is not an identifier",
                    token
                )));
            }
            alternatives.push(regex::escape(token));
        }

        Ok(Self {
            template: Regex::new(r"(?s)\$\{\{(.*?)\}\}")?,
            reference: Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))?,
        })
    }
}

impl ExpressionInspector for TokenInspector {
    fn has_user_group_attribute_in_expression(&self, expr: &str) -> bool {
        self.template
            .captures_iter(expr)
            .any(|caps| caps.get(1).is_some_and(|inner| self.reference.is_match(inner.as_str())))
    }

    fn has_user_group_attribute_reference(&self, values: &[String]) -> bool {
        values.iter().any(|value| self.reference.is_match(value))
    }
}
