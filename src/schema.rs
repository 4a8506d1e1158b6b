//! Schema introspection: project a type tree onto JSON Schema vocabulary.
//!
//! Pure and total over any constructed tree. `Optional` has no shape of its
//! own; it only drops the field from the parent's `required` list.
use serde_json::{json, Map, Value};

use crate::constraints::{Bound, NumberConstraints, StringConstraints};
use crate::ir::{ObjectType, Primitive, TypeVariant, Variant};

/// A JSON-Schema-shaped description. Recomputed on demand, never mutated.
pub type SchemaDescription = Value;

pub fn to_schema(ty: &TypeVariant) -> SchemaDescription {
    match ty.variant() {
        Variant::Primitive(p) => primitive_schema(p),
        Variant::Semantic(kind) => json!({ "type": "string", "format": kind.name() }),
        Variant::Array(arr) => {
            let mut o = json!({ "type": "array", "items": to_schema(&arr.item) });
            if let Some(mn) = arr.constraints.min_items { o["minItems"] = Value::from(mn); }
            if let Some(mx) = arr.constraints.max_items { o["maxItems"] = Value::from(mx); }
            o
        }
        Variant::Optional(inner) => to_schema(inner),
        Variant::Object(obj) => object_schema(obj),
    }
}

fn primitive_schema(p: &Primitive) -> Value {
    match p {
        Primitive::String(c) => string_schema(c),
        Primitive::Integer(c) => number_schema("integer", c),
        Primitive::Float(c) => number_schema("number", c),
        Primitive::Boolean => json!({ "type": "boolean" }),
        Primitive::Date => json!({ "type": "string", "format": "date" }),
        Primitive::DateTime => json!({ "type": "string", "format": "date-time" }),
    }
}

fn string_schema(c: &StringConstraints) -> Value {
    let mut o = json!({ "type": "string" });
    if let Some(m) = c.min_length { o["minLength"] = Value::from(m); }
    if let Some(m) = c.max_length { o["maxLength"] = Value::from(m); }
    if let Some(rx) = &c.pattern { o["pattern"] = Value::from(rx.as_str()); }
    if let Some(xs) = &c.one_of {
        o["enum"] = Value::Array(xs.iter().cloned().map(Value::from).collect());
    }
    o
}

fn number_schema<N: Bound>(ty: &str, c: &NumberConstraints<N>) -> Value {
    let mut o = json!({ "type": ty });
    if let Some(m) = c.minimum { o["minimum"] = m.to_json(); }
    if let Some(m) = c.maximum { o["maximum"] = m.to_json(); }
    if let Some(xs) = &c.one_of {
        o["enum"] = Value::Array(xs.iter().map(|x| x.to_json()).collect());
    }
    o
}

fn object_schema(obj: &ObjectType) -> Value {
    let mut props = Map::new();
    let mut required: Vec<Value> = Vec::new();
    for (name, field) in obj.fields() {
        let mut prop = to_schema(field.ty());
        if let Some(d) = field.description() { prop["description"] = Value::from(d); }
        if let Some(d) = field.default() { prop["default"] = d.clone(); }
        props.insert(name.clone(), prop);
        if field.is_required() {
            required.push(Value::from(name.as_str()));
        }
    }
    let mut o = json!({ "type": "object", "properties": props });
    if !required.is_empty() {
        o["required"] = Value::Array(required);
    }
    o["additionalProperties"] = Value::Bool(obj.additional_properties());
    o
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{ArrayConstraints, FloatConstraints, IntegerConstraints, ObjectOptions, Pattern};
    use crate::ir::Field;

    #[test]
    fn primitives_carry_constraints() {
        let ty = TypeVariant::string(StringConstraints {
            min_length: Some(1),
            max_length: Some(8),
            pattern: Some(Pattern::new("^[a-z]+$").unwrap()),
            one_of: None,
        })
        .unwrap();
        assert_eq!(
            to_schema(&ty),
            json!({"type": "string", "minLength": 1, "maxLength": 8, "pattern": "^[a-z]+$"})
        );
        let ty = TypeVariant::float(FloatConstraints { minimum: Some(0.5), ..Default::default() }).unwrap();
        assert_eq!(to_schema(&ty), json!({"type": "number", "minimum": 0.5}));
        let ty = TypeVariant::integer(IntegerConstraints { one_of: Some(vec![1, 2]), ..Default::default() }).unwrap();
        assert_eq!(to_schema(&ty), json!({"type": "integer", "enum": [1, 2]}));
    }

    #[test]
    fn semantic_and_dates_use_format() {
        assert_eq!(to_schema(&TypeVariant::uuid()), json!({"type": "string", "format": "uuid"}));
        assert_eq!(to_schema(&TypeVariant::email()), json!({"type": "string", "format": "email"}));
        assert_eq!(to_schema(&TypeVariant::datetime()), json!({"type": "string", "format": "date-time"}));
    }

    #[test]
    fn optional_only_shows_in_required_list() {
        let int = TypeVariant::integer(IntegerConstraints::default()).unwrap();
        let ty = TypeVariant::object(
            [
                ("id", Field::new(int.clone())),
                ("age", Field::new(TypeVariant::optional(int).unwrap()).with_description("years")),
                (
                    "tags",
                    Field::new(
                        TypeVariant::array(TypeVariant::any_string(), ArrayConstraints { min_items: Some(1), max_items: None })
                            .unwrap(),
                    ),
                ),
            ],
            ObjectOptions::default(),
        )
        .unwrap();
        assert_eq!(
            to_schema(&ty),
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "integer"},
                    "age": {"type": "integer", "description": "years"},
                    "tags": {"type": "array", "items": {"type": "string"}, "minItems": 1}
                },
                "required": ["id", "tags"],
                "additionalProperties": false
            })
        );
        // optional at the root has no union shape either
        let opt = TypeVariant::optional(TypeVariant::boolean()).unwrap();
        assert_eq!(to_schema(&opt), json!({"type": "boolean"}));
    }

    #[test]
    fn empty_required_is_omitted() {
        let ty = TypeVariant::object(
            [("a", TypeVariant::optional(TypeVariant::date()).unwrap())],
            ObjectOptions::permissive(),
        )
        .unwrap();
        let s = to_schema(&ty);
        assert!(s.get("required").is_none());
        assert_eq!(s["additionalProperties"], json!(true));
    }
}
