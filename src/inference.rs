//! Auto-derivation: build a type tree from a source that already carries type
//! information, instead of declaring it by hand.
//!
//! Entry points:
//! - [`from_json_schema`]: a JSON Schema document (`type`/`format`, `required`, `$ref`).
//! - [`from_record`]: an example record whose values stand in for their types.
//! - [`from_serialize`]: any `Serialize` record, read the same way as [`from_record`].
//!
//! Each takes a [`FieldFilter`] that narrows the root object's fields after
//! inference. A root that is not an object is rejected.
pub mod filter;
pub mod json_schema;
pub mod record;

pub use filter::FieldFilter;
pub use json_schema::from_json_schema;
pub use record::{from_record, from_serialize};

use indexmap::IndexMap;

use crate::constraints::ObjectOptions;
use crate::error::TypeError;
use crate::ir::{Field, TypeVariant};

// Shared tail of every entry point: filter the root fields, then build.
fn finish_root(
    fields: IndexMap<String, Field>,
    options: ObjectOptions,
    filter: &FieldFilter,
) -> Result<TypeVariant, TypeError> {
    let fields = filter.apply(fields)?;
    tracing::debug!(fields = fields.len(), strict = !options.additional_properties, "derived object type");
    TypeVariant::object(fields, options)
}
