//! Coercion: best-effort conversion of loosely-typed input into a typed value.
//!
//! Lenient where validation is strict: numeric strings become numbers,
//! `"true"`/`"1"` become booleans, canonical date strings become dates.
//! After conversion the primitive's own constraints still apply.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::constraints::obj::unexpected_fields_message;
use crate::error::CoercionError;
use crate::formats;
use crate::ir::{ArrayType, ObjectType, Primitive, SemanticKind, TypeVariant, Variant};
use crate::validate::{check_semantic, undeclared_keys};
use crate::value::{json_kind, TypedValue};

pub fn coerce(ty: &TypeVariant, value: &Value) -> Result<TypedValue, CoercionError> {
    match ty.variant() {
        Variant::Primitive(p) => coerce_primitive(ty, p, value),
        Variant::Semantic(kind) => coerce_semantic(ty, *kind, value),
        Variant::Optional(inner) => {
            if value.is_null() { Ok(TypedValue::Null) } else { coerce(inner, value) }
        }
        Variant::Array(arr) => match value.as_array() {
            Some(items) => coerce_array(ty, arr, value, items),
            None => Err(mismatch(ty, "array", value)),
        },
        Variant::Object(obj) => match value.as_object() {
            Some(map) => coerce_object(ty, obj, value, map),
            None => Err(mismatch(ty, "object", value)),
        },
    }
}

fn mismatch(ty: &TypeVariant, expected: &str, value: &Value) -> CoercionError {
    CoercionError::new(value, ty.type_name(), format!("Expected {expected}, got {}", json_kind(value)))
}

// ------------------------------- Primitives -------------------------------- //

fn coerce_primitive(ty: &TypeVariant, p: &Primitive, value: &Value) -> Result<TypedValue, CoercionError> {
    let fail = |reason: String| CoercionError::new(value, ty.type_name(), reason);
    match p {
        Primitive::String(c) => {
            let s = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(mismatch(ty, "string", value)),
            };
            match c.check(&s) {
                Some(reason) => Err(fail(reason)),
                None => Ok(TypedValue::String(s)),
            }
        }
        Primitive::Integer(c) => {
            let i = to_integer(value).map_err(fail)?;
            match c.check(i) {
                Some(reason) => Err(fail(reason)),
                None => Ok(TypedValue::Integer(i)),
            }
        }
        Primitive::Float(c) => {
            let f = to_float(value).map_err(fail)?;
            match c.check(f) {
                Some(reason) => Err(fail(reason)),
                None => Ok(TypedValue::Float(f)),
            }
        }
        Primitive::Boolean => to_boolean(value).map(TypedValue::Boolean).map_err(fail),
        Primitive::Date => match value.as_str() {
            Some(s) => formats::parse_date(s.trim())
                .map(TypedValue::Date)
                .ok_or_else(|| fail(format!("'{s}' is not a valid date (expected YYYY-MM-DD)"))),
            None => Err(mismatch(ty, "date", value)),
        },
        Primitive::DateTime => match value.as_str() {
            Some(s) => formats::parse_datetime(s.trim())
                .map(TypedValue::DateTime)
                .ok_or_else(|| fail(format!("'{s}' is not a valid datetime (expected RFC 3339)"))),
            None => Err(mismatch(ty, "datetime", value)),
        },
    }
}

/// Integers pass through, floats truncate toward zero, booleans map to 1/0,
/// strings must spell a base-10 integer.
fn to_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            let f = n.as_f64().unwrap_or(f64::NAN);
            truncate(f).ok_or_else(|| format!("Value {n} is out of range for integer"))
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| format!("'{s}' is not a valid integer")),
        other => Err(format!("Expected integer, got {}", json_kind(other))),
    }
}

fn truncate(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

fn to_float(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("Value {n} is not representable as float")),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(f),
            _ => Err(format!("'{s}' is not a valid float")),
        },
        other => Err(format!("Expected float, got {}", json_kind(other))),
    }
}

/// Case-sensitive: `"True"` is rejected.
fn to_boolean(value: &Value) -> Result<bool, String> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(format!("'{s}' is not a valid boolean")),
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(format!("Value {n} is not a valid boolean")),
        },
        other => Err(format!("Expected boolean, got {}", json_kind(other))),
    }
}

fn coerce_semantic(ty: &TypeVariant, kind: SemanticKind, value: &Value) -> Result<TypedValue, CoercionError> {
    if let Some(reason) = check_semantic(kind, value) {
        return Err(CoercionError::new(value, ty.type_name(), reason));
    }
    let s = value.as_str().unwrap_or_default();
    match kind {
        SemanticKind::Uuid => uuid::Uuid::parse_str(s)
            .map(TypedValue::Uuid)
            .map_err(|e| CoercionError::new(value, ty.type_name(), e.to_string())),
        SemanticKind::Email => Ok(TypedValue::String(s.to_string())),
    }
}

// ------------------------------- Composites -------------------------------- //

fn coerce_array(
    ty: &TypeVariant,
    arr: &ArrayType,
    value: &Value,
    items: &[Value],
) -> Result<TypedValue, CoercionError> {
    if let Some(reason) = arr.constraints.check(items.len()) {
        return Err(CoercionError::new(value, ty.type_name(), reason));
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| coerce(&arr.item, item).map_err(|e| e.at_index(i)))
        .collect::<Result<Vec<_>, _>>()
        .map(TypedValue::Array)
}

fn coerce_object(
    ty: &TypeVariant,
    obj: &ObjectType,
    value: &Value,
    map: &Map<String, Value>,
) -> Result<TypedValue, CoercionError> {
    // strict: reject before touching any field
    if obj.is_strict() {
        let unexpected = undeclared_keys(obj, map);
        if !unexpected.is_empty() {
            let reason = unexpected_fields_message(&unexpected, obj.fields().keys());
            tracing::trace!(%reason, "rejecting undeclared keys");
            return Err(CoercionError::new(value, ty.type_name(), reason));
        }
    }

    let mut out = IndexMap::with_capacity(obj.fields().len());
    for (name, field) in obj.fields() {
        let source = match (map.get(name), field.default()) {
            (Some(v), _) => v,
            (None, Some(default)) => default,
            (None, None) if field.is_required() => {
                return Err(CoercionError::new(
                    value,
                    ty.type_name(),
                    format!("Required field '{name}' is missing from hash"),
                ));
            }
            (None, None) => continue,
        };
        let coerced = coerce(field.ty(), source).map_err(|e| e.in_field(name))?;
        out.insert(name.clone(), coerced);
    }

    // permissive: undeclared keys ride along untouched
    if !obj.is_strict() {
        for (k, v) in map {
            if obj.field(k).is_none() {
                out.insert(k.clone(), passthrough(v));
            }
        }
    }
    Ok(TypedValue::Object(out))
}

fn passthrough(v: &Value) -> TypedValue {
    match v {
        Value::Null => TypedValue::Null,
        Value::Bool(b) => TypedValue::Boolean(*b),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => TypedValue::Integer(i),
            (None, Some(u)) => TypedValue::Unsigned(u),
            (None, None) => TypedValue::Float(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => TypedValue::String(s.clone()),
        Value::Array(xs) => TypedValue::Array(xs.iter().map(passthrough).collect()),
        Value::Object(m) => TypedValue::Object(m.iter().map(|(k, v)| (k.clone(), passthrough(v))).collect()),
    }
}
