use json_shape::{
    ArrayConstraints, Field, FieldFilter, IntegerConstraints, ObjectOptions, StringConstraints, TypeVariant,
    TypedValue, from_json_schema, from_record,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn int() -> TypeVariant {
    TypeVariant::integer(IntegerConstraints::default()).unwrap()
}

// ————————————————————————————————————————————————————————————————————————————
// SCENARIOS
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn short_string_fails_minimum_length() {
    let ty = TypeVariant::string(StringConstraints { min_length: Some(5), ..Default::default() }).unwrap();
    let result = ty.validate(&json!("hi"));
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("below minimum"));
}

#[test]
fn integer_coerces_numeric_strings_only() {
    assert_eq!(int().coerce(&json!("42")).unwrap(), TypedValue::Integer(42));
    let err = int().coerce(&json!("abc")).unwrap_err();
    assert_eq!(err.value, json!("abc"));
    assert_eq!(err.target_type, "integer");
}

#[test]
fn short_array_fails_minimum_items() {
    let ty = TypeVariant::array(TypeVariant::any_string(), ArrayConstraints { min_items: Some(2), max_items: None })
        .unwrap();
    let result = ty.validate(&json!(["one"]));
    assert!(!result.valid);
    assert!(result.errors[0].contains("minimum"));
}

#[test]
fn optional_accepts_null_and_delegates_otherwise() {
    let ty = TypeVariant::optional(int()).unwrap();
    assert!(ty.validate(&Value::Null).valid);
    assert!(!ty.validate(&json!("x")).valid);
}

#[test]
fn absent_optional_field_is_omitted_on_coerce() {
    let ty = TypeVariant::object(
        [("id", int()), ("age", TypeVariant::optional(int()).unwrap())],
        ObjectOptions::default(),
    )
    .unwrap();
    let typed = ty.coerce(&json!({"id": "7"})).unwrap();
    assert_eq!(typed.to_json(), json!({"id": 7}));
    assert_eq!(typed.get("id"), Some(&TypedValue::Integer(7)));
    assert!(typed.get("age").is_none());
}

#[test]
fn strict_object_rejects_undeclared_keys_both_ways() {
    let ty = TypeVariant::object([("a", TypeVariant::any_string())], ObjectOptions::strict()).unwrap();
    let input = json!({"a": "x", "b": "y"});

    let result = ty.validate(&input);
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.contains("b") && e.contains("Allowed fields: a")));

    let err = ty.coerce(&input).unwrap_err();
    assert!(err.reason.contains("Unexpected fields: b"));
    assert!(err.reason.contains("Allowed fields: a"));
}

#[test]
fn missing_required_field_is_named() {
    let ty = TypeVariant::object([("id", int()), ("name", TypeVariant::any_string())], ObjectOptions::default())
        .unwrap();
    let result = ty.validate(&json!({"name": "x"}));
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.contains("'id'")));
}

#[test]
fn nested_coercion_errors_carry_their_path() {
    let row = TypeVariant::object([("n", int())], ObjectOptions::default()).unwrap();
    let ty = TypeVariant::object(
        [("rows", TypeVariant::array(row, ArrayConstraints::default()).unwrap())],
        ObjectOptions::default(),
    )
    .unwrap();
    let err = ty.coerce(&json!({"rows": [{"n": 1}, {"n": "x"}]})).unwrap_err();
    assert_eq!(err.reason, "Field 'rows': Item at index 1: Field 'n': 'x' is not a valid integer");
    assert_eq!(err.value, json!("x"));
    assert_eq!(err.target_type, "integer");
}

#[test]
fn defaults_fill_missing_fields() {
    let ty = TypeVariant::object(
        [
            ("id", Field::new(int())),
            ("role", Field::new(TypeVariant::any_string()).with_default(json!("member"))),
        ],
        ObjectOptions::default(),
    )
    .unwrap();
    assert_eq!(ty.coerce(&json!({"id": 1})).unwrap().to_json(), json!({"id": 1, "role": "member"}));
    // validation agrees with coercion about the filled-in field
    assert!(ty.validate(&json!({"id": 1})).valid);
    assert!(!ty.validate(&json!({"role": "admin"})).valid);
    assert!(ty.coerce(&json!({"role": "admin"})).is_err());
    assert!(
        TypeVariant::object([("n", Field::new(int()).with_default(json!("many")))], ObjectOptions::default())
            .is_err()
    );
}

// ————————————————————————————————————————————————————————————————————————————
// DERIVATION
// ————————————————————————————————————————————————————————————————————————————

#[test]
fn json_schema_round_trips_through_to_schema() {
    let doc = json!({
        "type": "object",
        "properties": {
            "id": {"type": "string", "format": "uuid"},
            "email": {"type": "string", "format": "email"},
            "age": {"type": "integer", "minimum": 0},
            "score": {"type": "number"},
            "joined": {"type": "string", "format": "date"},
            "tags": {"type": "array", "items": {"type": "string", "maxLength": 10}, "maxItems": 5},
            "address": {
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"],
                "additionalProperties": false
            }
        },
        "required": ["id", "email", "address"],
        "additionalProperties": false
    });
    let ty = from_json_schema(&doc, &FieldFilter::all()).unwrap();
    assert_eq!(ty.to_schema(), doc);
}

#[test]
fn derived_types_validate_their_sources() {
    let record = json!({
        "id": 3,
        "name": "widget",
        "price": 2.5,
        "released": "2023-11-02",
        "parts": [{"sku": "a-1", "qty": 2}],
        "active": true
    });
    let ty = from_record(&record, &FieldFilter::all()).unwrap();
    assert!(ty.validate(&record).valid);
    assert_eq!(ty.coerce(&record).unwrap().to_json(), record);

    let narrowed = from_record(&record, &FieldFilter::only(["id", "name"])).unwrap();
    assert!(!narrowed.validate(&record).valid);
    assert!(narrowed.validate(&json!({"id": 1, "name": "x"})).valid);
}

// ————————————————————————————————————————————————————————————————————————————
// PROPERTIES
// ————————————————————————————————————————————————————————————————————————————

proptest! {
    #[test]
    fn strings_within_bounds_are_valid(s in "[a-z]{2,12}") {
        let ty = TypeVariant::string(StringConstraints {
            min_length: Some(2),
            max_length: Some(12),
            ..Default::default()
        })
        .unwrap();
        prop_assert!(ty.validate(&json!(s)).valid);
    }

    #[test]
    fn integers_within_range_are_valid(n in -1000i64..=1000) {
        let ty = TypeVariant::integer(IntegerConstraints {
            minimum: Some(-1000),
            maximum: Some(1000),
            ..Default::default()
        })
        .unwrap();
        prop_assert!(ty.validate(&json!(n)).valid);
    }

    #[test]
    fn integer_coercion_is_idempotent(n in any::<i64>()) {
        let once = int().coerce(&json!(n.to_string())).unwrap();
        prop_assert_eq!(&once, &TypedValue::Integer(n));
        prop_assert_eq!(int().coerce(&once.to_json()).unwrap(), once);
    }

    #[test]
    fn record_coercion_is_idempotent(id in any::<i32>(), flag in any::<bool>(), day in 1u32..=28) {
        let ty = TypeVariant::object(
            [
                ("id", int()),
                ("flag", TypeVariant::boolean()),
                ("day", TypeVariant::date()),
                ("note", TypeVariant::optional(TypeVariant::any_string()).unwrap()),
            ],
            ObjectOptions::default(),
        )
        .unwrap();
        let input = json!({
            "id": id.to_string(),
            "flag": if flag { "1" } else { "0" },
            "day": format!("2024-02-{day:02}"),
        });
        let once = ty.coerce(&input).unwrap();
        prop_assert_eq!(ty.coerce(&once.to_json()).unwrap(), once);
    }
}
