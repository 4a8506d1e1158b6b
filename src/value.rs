//! Coerced values and their wire form.
use chrono::{DateTime, FixedOffset, NaiveDate};
use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::formats;

/// A value in the shape a [`crate::TypeVariant`] describes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    String(String),
    Integer(i64),
    /// Only produced for undeclared keys of permissive objects, whose
    /// unsigned values may not fit `i64`.
    Unsigned(u64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Uuid(Uuid),
    Array(Vec<TypedValue>),
    Object(IndexMap<String, TypedValue>),
}

impl TypedValue {
    /// Wire representation. Coercing this back against the same type yields
    /// an equal `TypedValue`.
    pub fn to_json(&self) -> Value {
        match self {
            TypedValue::Null => Value::Null,
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Integer(i) => Value::from(*i),
            TypedValue::Unsigned(u) => Value::from(*u),
            TypedValue::Float(f) => Value::from(*f),
            TypedValue::Boolean(b) => Value::Bool(*b),
            TypedValue::Date(d) => Value::String(formats::format_date(d)),
            TypedValue::DateTime(dt) => Value::String(formats::format_datetime(dt)),
            TypedValue::Uuid(u) => Value::String(u.hyphenated().to_string()),
            TypedValue::Array(xs) => Value::Array(xs.iter().map(TypedValue::to_json).collect()),
            TypedValue::Object(m) => Value::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()),
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, TypedValue::Null) }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            TypedValue::Integer(i) => u64::try_from(*i).ok(),
            TypedValue::Unsigned(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Array(xs) => Some(xs.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, TypedValue>> {
        match self {
            TypedValue::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Field lookup on objects; `None` for anything else.
    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.as_object().and_then(|m| m.get(field))
    }
}

impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::Null => serializer.serialize_unit(),
            TypedValue::String(s) => serializer.serialize_str(s),
            TypedValue::Integer(i) => serializer.serialize_i64(*i),
            TypedValue::Unsigned(u) => serializer.serialize_u64(*u),
            TypedValue::Float(f) => serializer.serialize_f64(*f),
            TypedValue::Boolean(b) => serializer.serialize_bool(*b),
            TypedValue::Date(d) => serializer.serialize_str(&formats::format_date(d)),
            TypedValue::DateTime(dt) => serializer.serialize_str(&formats::format_datetime(dt)),
            TypedValue::Uuid(u) => serializer.serialize_str(&u.hyphenated().to_string()),
            TypedValue::Array(xs) => serializer.collect_seq(xs),
            TypedValue::Object(m) => serializer.collect_map(m),
        }
    }
}

/// JSON kind name used in "Expected X, got Y" messages.
pub fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
