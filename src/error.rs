//! Error types.
//!
//! Two separate taxonomies:
//! - [`TypeError`]: a malformed declaration, raised while a tree is built.
//! - [`CoercionError`]: a value that could not be turned into the declared shape.
//!
//! Validation failures are not errors at all; see [`crate::validate::ValidationResult`].
use serde_json::Value;
use thiserror::Error;

/// Raised while constructing or deriving a [`crate::TypeVariant`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("invalid {kind} options at `{path}`: {reason}")]
    InvalidOptions {
        kind: &'static str,
        path: String,
        reason: String,
    },

    #[error("invalid {kind} constraints: {reason}")]
    InvalidConstraint { kind: &'static str, reason: String },

    #[error("duplicate field '{field}'")]
    DuplicateField { field: String },

    #[error("default for field '{field}' does not fit its type: {reason}")]
    InvalidDefault { field: String, reason: String },

    #[error("type tree exceeds the maximum nesting depth of {max}")]
    TooDeep { max: usize },

    #[error("cyclic type reference through `{reference}`")]
    Cyclic { reference: String },

    #[error("field '{field}' is not a type declaration: {reason}")]
    NotATypeDeclaration { field: String, reason: String },

    #[error("unsupported schema at `{path}`: {reason}")]
    UnsupportedSchema { path: String, reason: String },

    #[error("cannot derive a type from a non-object root (got {found})")]
    NonObjectRoot { found: &'static str },

    #[error("unknown field '{field}' in `{filter}` filter")]
    UnknownFilterField { filter: &'static str, field: String },

    #[error("record could not be serialized: {reason}")]
    Unserializable { reason: String },
}

/// Raised by [`crate::coerce::coerce`].
///
/// `value` and `target_type` always describe the innermost failure, so callers
/// can build a field-specific message without parsing `reason`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot coerce {value} to {target_type}: {reason}")]
pub struct CoercionError {
    pub value: Value,
    pub target_type: String,
    pub reason: String,
}

impl CoercionError {
    pub fn new(value: &Value, target_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.clone(),
            target_type: target_type.into(),
            reason: reason.into(),
        }
    }

    /// Re-raise with the object field name in front of the reason.
    pub(crate) fn in_field(self, name: &str) -> Self {
        Self { reason: format!("Field '{name}': {}", self.reason), ..self }
    }

    /// Re-raise with the array position in front of the reason.
    pub(crate) fn at_index(self, index: usize) -> Self {
        Self { reason: format!("Item at index {index}: {}", self.reason), ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rewrapping_keeps_value_and_target() {
        let inner = CoercionError::new(&json!("abc"), "integer", "'abc' is not a valid integer");
        let outer = inner.at_index(2).in_field("ids");
        assert_eq!(outer.value, json!("abc"));
        assert_eq!(outer.target_type, "integer");
        assert_eq!(outer.reason, "Field 'ids': Item at index 2: 'abc' is not a valid integer");
    }

    #[test]
    fn display_includes_reason() {
        let err = CoercionError::new(&json!(null), "string", "Expected string, got null");
        assert_eq!(err.to_string(), "cannot coerce null to string: Expected string, got null");
    }
}
