//! Derive a type tree from an example record.
//!
//! Each field's type is read off the JSON kind of its example value:
//! - string: `DateTime` if RFC 3339, `Date` if `YYYY-MM-DD`, else `String`
//! - integer / float / boolean: the matching primitive
//! - array: `Array` of the first element's type, `Array<String>` when empty
//! - object: a nested strict `Object`
//! - null: `String`, the conservative fallback
//!
//! All inferred fields are required and carry no constraints.
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constraints::{ArrayConstraints, IntegerConstraints, FloatConstraints, ObjectOptions};
use crate::error::TypeError;
use crate::formats;
use crate::ir::{Field, MAX_DEPTH, TypeVariant};
use crate::value::json_kind;

use super::FieldFilter;

pub fn from_record(record: &Value, filter: &FieldFilter) -> Result<TypeVariant, TypeError> {
    let Some(map) = record.as_object() else {
        return Err(TypeError::NonObjectRoot { found: json_kind(record) });
    };
    let fields = observe_fields(map, 0)?;
    super::finish_root(fields, ObjectOptions::default(), filter)
}

/// Serialize `record` (any `serde` type: a struct, a map, ...) and derive from
/// its JSON form. `Option::None` fields therefore fall back to `String`.
pub fn from_serialize<T: Serialize + ?Sized>(record: &T, filter: &FieldFilter) -> Result<TypeVariant, TypeError> {
    let value = serde_json::to_value(record).map_err(|e| TypeError::Unserializable { reason: e.to_string() })?;
    from_record(&value, filter)
}

fn observe_fields(map: &Map<String, Value>, depth: usize) -> Result<IndexMap<String, Field>, TypeError> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), Field::new(observe_value(v, depth + 1)?))))
        .collect()
}

fn observe_value(v: &Value, depth: usize) -> Result<TypeVariant, TypeError> {
    if depth >= MAX_DEPTH {
        return Err(TypeError::TooDeep { max: MAX_DEPTH });
    }
    match v {
        Value::Null => Ok(TypeVariant::any_string()),
        Value::Bool(_) => Ok(TypeVariant::boolean()),
        Value::Number(n) if n.is_i64() || n.is_u64() => TypeVariant::integer(IntegerConstraints::default()),
        Value::Number(_) => TypeVariant::float(FloatConstraints::default()),
        Value::String(s) => Ok(observe_string(s)),
        Value::Array(xs) => {
            let item = match xs.first() {
                Some(first) => observe_value(first, depth + 1)?,
                None => TypeVariant::any_string(),
            };
            TypeVariant::array(item, ArrayConstraints::default())
        }
        Value::Object(m) => TypeVariant::object(observe_fields(m, depth)?, ObjectOptions::default()),
    }
}

fn observe_string(s: &str) -> TypeVariant {
    if formats::parse_datetime(s).is_some() {
        TypeVariant::datetime()
    } else if formats::parse_date(s).is_some() {
        TypeVariant::date()
    } else {
        TypeVariant::any_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Primitive, Variant};
    use crate::schema::to_schema;
    use serde_json::json;

    fn kind_of(ty: &TypeVariant) -> String { ty.type_name() }

    #[test]
    fn infers_each_field_from_its_example() {
        let ty = from_record(
            &json!({
                "name": "Ada",
                "age": 36,
                "score": 9.5,
                "admin": false,
                "born": "1815-12-10",
                "seen": "2024-05-01T09:00:00Z",
                "tags": ["a", "b"],
                "ids": [],
                "nickname": null,
                "address": {"city": "London", "zip": 12345}
            }),
            &FieldFilter::all(),
        )
        .unwrap();
        let obj = ty.as_object().unwrap();
        let got = obj.fields().iter().map(|(k, f)| (k.as_str(), kind_of(f.ty()))).collect::<Vec<_>>();
        assert_eq!(
            got,
            [
                ("name", "string".to_string()),
                ("age", "integer".to_string()),
                ("score", "float".to_string()),
                ("admin", "boolean".to_string()),
                ("born", "date".to_string()),
                ("seen", "datetime".to_string()),
                ("tags", "array<string>".to_string()),
                ("ids", "array<string>".to_string()),
                ("nickname", "string".to_string()),
                ("address", "object".to_string()),
            ]
        );
        assert!(obj.fields().values().all(|f| f.is_required()));
        assert_eq!(
            to_schema(obj.field("address").unwrap().ty()),
            json!({
                "type": "object",
                "properties": {"city": {"type": "string"}, "zip": {"type": "integer"}},
                "required": ["city", "zip"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn array_item_type_comes_from_first_element() {
        let ty = from_record(&json!({"xs": [1, "two"]}), &FieldFilter::all()).unwrap();
        let xs = ty.as_object().unwrap().field("xs").unwrap().ty();
        match xs.variant() {
            Variant::Array(a) => assert!(matches!(a.item.variant(), Variant::Primitive(Primitive::Integer(_)))),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert_eq!(from_record(&json!([1, 2]), &FieldFilter::all()).unwrap_err(), TypeError::NonObjectRoot { found: "array" });
        assert_eq!(from_record(&json!("x"), &FieldFilter::all()).unwrap_err(), TypeError::NonObjectRoot { found: "string" });
    }

    #[test]
    fn filters_narrow_the_root() {
        let rec = json!({"id": 1, "secret": "x", "name": "n"});
        let ty = from_record(&rec, &FieldFilter::except(["secret"])).unwrap();
        assert_eq!(ty.as_object().unwrap().fields().keys().collect::<Vec<_>>(), ["id", "name"]);
        assert!(from_record(&rec, &FieldFilter::only(["nope"])).is_err());
    }

    #[derive(Serialize)]
    struct Signup {
        email: String,
        age: u8,
        birthday: String,
        referrer: Option<String>,
    }

    #[test]
    fn serialize_records_derive_like_json() {
        let sample = Signup {
            email: "a@b.co".into(),
            age: 30,
            birthday: "1990-04-02".into(),
            referrer: None,
        };
        let ty = from_serialize(&sample, &FieldFilter::all()).unwrap();
        let names = ty
            .as_object()
            .unwrap()
            .fields()
            .iter()
            .map(|(k, f)| format!("{k}:{}", f.ty().type_name()))
            .collect::<Vec<_>>();
        assert_eq!(names, ["email:string", "age:integer", "birthday:date", "referrer:string"]);
        assert!(from_serialize(&vec![1, 2], &FieldFilter::all()).is_err());
    }

    #[test]
    fn derived_type_validates_its_own_example() {
        let rec = json!({"a": 1, "b": [true], "c": {"d": "2020-01-01"}});
        let ty = from_record(&rec, &FieldFilter::all()).unwrap();
        assert!(crate::validate::validate(&ty, &rec).valid);
    }
}
