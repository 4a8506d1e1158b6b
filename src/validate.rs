//! Validation: walk a type tree against a value and collect every failure.
//!
//! Never fails itself; the outcome is data. Object fields and array items
//! accumulate errors, while a single primitive stops at its first failing
//! check (type, then format, then range, pattern, enum).
use std::fmt;

use serde_json::{Map, Value};

use crate::constraints::obj::unexpected_fields_message;
use crate::formats;
use crate::ir::{ArrayType, ObjectType, Primitive, SemanticKind, TypeVariant, Variant};
use crate::value::json_kind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self { valid: errors.is_empty(), errors }
    }
    pub fn is_valid(&self) -> bool { self.valid }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        f.write_str(&self.errors.join("; "))
    }
}

pub fn validate(ty: &TypeVariant, value: &Value) -> ValidationResult {
    ValidationResult::from_errors(collect_errors(ty, value))
}

fn collect_errors(ty: &TypeVariant, value: &Value) -> Vec<String> {
    match ty.variant() {
        Variant::Primitive(p) => check_primitive(p, value).into_iter().collect(),
        Variant::Semantic(kind) => check_semantic(*kind, value).into_iter().collect(),
        Variant::Optional(inner) => {
            if value.is_null() { Vec::new() } else { collect_errors(inner, value) }
        }
        Variant::Array(arr) => match value.as_array() {
            None => vec![mismatch("array", value)],
            Some(items) => array_errors(arr, items),
        },
        Variant::Object(obj) => match value.as_object() {
            None => vec![mismatch("object", value)],
            Some(map) => object_errors(obj, map),
        },
    }
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("Expected {expected}, got {}", json_kind(value))
}

/// First failure for a primitive, if any.
pub(crate) fn check_primitive(p: &Primitive, value: &Value) -> Option<String> {
    match p {
        Primitive::String(c) => match value.as_str() {
            Some(s) => c.check(s),
            None => Some(mismatch("string", value)),
        },
        Primitive::Integer(c) => match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => c.check(i),
                None if n.is_u64() => Some(format!("Value {n} is out of range for integer")),
                None => Some(mismatch("integer", value)),
            },
            _ => Some(mismatch("integer", value)),
        },
        Primitive::Float(c) => match value.as_f64() {
            Some(f) => c.check(f),
            None => Some(mismatch("float", value)),
        },
        Primitive::Boolean => {
            if value.is_boolean() { None } else { Some(mismatch("boolean", value)) }
        }
        Primitive::Date => match value.as_str() {
            Some(s) if formats::parse_date(s).is_some() => None,
            Some(_) => Some("Invalid date format (expected YYYY-MM-DD)".to_string()),
            None => Some(mismatch("date", value)),
        },
        Primitive::DateTime => match value.as_str() {
            Some(s) if formats::parse_datetime(s).is_some() => None,
            Some(_) => Some("Invalid datetime format (expected RFC 3339)".to_string()),
            None => Some(mismatch("datetime", value)),
        },
    }
}

pub(crate) fn check_semantic(kind: SemanticKind, value: &Value) -> Option<String> {
    let Some(s) = value.as_str() else {
        return Some(mismatch("string", value));
    };
    let ok = match kind {
        SemanticKind::Uuid => formats::is_uuid(s),
        SemanticKind::Email => formats::is_email(s),
    };
    if ok { None } else { Some(format!("Invalid {} format", kind.label())) }
}

fn array_errors(arr: &ArrayType, items: &[Value]) -> Vec<String> {
    let mut errors: Vec<String> = arr.constraints.check(items.len()).into_iter().collect();
    for (i, item) in items.iter().enumerate() {
        for e in collect_errors(&arr.item, item) {
            errors.push(format!("Item at index {i}: {e}"));
        }
    }
    errors
}

fn object_errors(obj: &ObjectType, map: &Map<String, Value>) -> Vec<String> {
    let mut errors = Vec::new();
    for (name, field) in obj.fields() {
        match map.get(name) {
            None if field.is_required() => errors.push(format!("Field '{name}' is required")),
            None => {}
            Some(v) => {
                for e in collect_errors(field.ty(), v) {
                    errors.push(format!("Field '{name}': {e}"));
                }
            }
        }
    }
    if obj.is_strict() {
        let unexpected = undeclared_keys(obj, map);
        if !unexpected.is_empty() {
            errors.push(unexpected_fields_message(&unexpected, obj.fields().keys()));
        }
    }
    errors
}

/// Input keys with no declared field, in input order.
pub(crate) fn undeclared_keys<'v>(obj: &ObjectType, map: &'v Map<String, Value>) -> Vec<&'v str> {
    map.keys()
        .filter(|k| obj.field(k).is_none())
        .map(|k| k.as_str())
        .collect()
}
