//! Per-kind constraint sets.
//!
//! Each primitive kind carries its own struct, so a constraint that makes no
//! sense for a kind cannot be attached to it. All of them deserialize from a
//! JSON-Schema-flavoured options bag (camelCase keys, unknown keys rejected).
//!
//! Checks return the first failing message only. The evaluation order inside
//! each `check` is fixed: range, then pattern, then enum. Format checks happen
//! before any of these, in the validator.
pub mod str;
pub mod num;
pub mod arr;
pub mod obj;

use serde::Deserialize;

pub use str::{Pattern, StringConstraints};
pub use num::{Bound, FloatConstraints, IntegerConstraints, NumberConstraints};
pub use arr::ArrayConstraints;
pub use obj::ObjectOptions;

/// Options bag for kinds that accept no constraints at all
/// (boolean, date, datetime, uuid, email).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoConstraints {}

// Shared by the enum arms of every kind.
fn list<T: std::fmt::Display>(xs: &[T]) -> String {
    xs.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(", ")
}
