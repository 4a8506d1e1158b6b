//! Runtime type declarations for JSON-shaped data.
//!
//! A [`TypeVariant`] tree is built once (by hand through its constructors, or
//! derived with [`inference`]) and then used read-only to:
//! - [`validate`](validate::validate) a value, collecting every failure;
//! - [`coerce`](coerce::coerce) a loosely-typed value into a [`TypedValue`];
//! - describe itself as a JSON Schema document with [`to_schema`](schema::to_schema).
pub mod coerce;
pub mod constraints;
pub mod error;
pub mod formats;
pub mod inference;
pub mod ir;
pub mod path_de;
pub mod schema;
pub mod validate;
pub mod value;

pub use constraints::{
    ArrayConstraints, FloatConstraints, IntegerConstraints, ObjectOptions, Pattern, StringConstraints,
};
pub use error::{CoercionError, TypeError};
pub use inference::{FieldFilter, from_json_schema, from_record, from_serialize};
pub use ir::{Field, PrimitiveKind, SemanticKind, TypeVariant, Variant};
pub use schema::SchemaDescription;
pub use validate::ValidationResult;
pub use value::TypedValue;
