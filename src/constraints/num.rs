use std::fmt::Display;

use serde::de::Deserializer;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::TypeError;

/// A numeric kind's scalar: how it is read from and written back to JSON.
pub trait Bound: Copy + PartialOrd + Display {
    const KIND: &'static str;
    fn from_number(n: &Number) -> Option<Self>;
    fn to_json(self) -> Value;
}

impl Bound for i64 {
    const KIND: &'static str = "integer";

    /// `0.0` and `1e3` name integers too; `1.5` does not.
    fn from_number(n: &Number) -> Option<Self> {
        n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            let integral = f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64;
            integral.then_some(f as i64)
        })
    }

    fn to_json(self) -> Value { Value::from(self) }
}

impl Bound for f64 {
    const KIND: &'static str = "float";

    fn from_number(n: &Number) -> Option<Self> { n.as_f64() }

    /// Integral values are written without a fraction, so `"minimum": 0`
    /// reads back as it was written.
    fn to_json(self) -> Value {
        const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
        if self.fract() == 0.0 && self.abs() <= EXACT {
            Value::from(self as i64)
        } else {
            Value::from(self)
        }
    }
}

fn bound_from<N: Bound, E: serde::de::Error>(n: &Number) -> Result<N, E> {
    N::from_number(n).ok_or_else(|| E::custom(format!("{n} is not a valid {} bound", N::KIND)))
}

fn optional_bound<'de, D: Deserializer<'de>, N: Bound>(d: D) -> Result<Option<N>, D::Error> {
    Option::<Number>::deserialize(d)?.as_ref().map(bound_from::<N, D::Error>).transpose()
}

fn bound_list<'de, D: Deserializer<'de>, N: Bound>(d: D) -> Result<Option<Vec<N>>, D::Error> {
    match Option::<Vec<Number>>::deserialize(d)? {
        None => Ok(None),
        Some(xs) => xs.iter().map(bound_from::<N, D::Error>).collect::<Result<Vec<_>, _>>().map(Some),
    }
}

/// Bounds and enumerated values for a numeric kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase", bound(deserialize = "N: Bound"))]
pub struct NumberConstraints<N> {
    #[serde(deserialize_with = "optional_bound")]
    pub minimum: Option<N>,
    #[serde(deserialize_with = "optional_bound")]
    pub maximum: Option<N>,
    #[serde(rename = "enum", deserialize_with = "bound_list")]
    pub one_of: Option<Vec<N>>,
}

pub type IntegerConstraints = NumberConstraints<i64>;
pub type FloatConstraints = NumberConstraints<f64>;

// Manual impl: derive would demand `N: Default`.
impl<N> Default for NumberConstraints<N> {
    fn default() -> Self { Self { minimum: None, maximum: None, one_of: None } }
}

impl<N: Bound> NumberConstraints<N> {
    pub(crate) fn check_consistent(&self, kind: &'static str) -> Result<(), TypeError> {
        if let (Some(lo), Some(hi)) = (self.minimum, self.maximum) {
            if lo > hi {
                return Err(TypeError::InvalidConstraint {
                    kind,
                    reason: format!("minimum {lo} is greater than maximum {hi}"),
                });
            }
        }
        Ok(())
    }

    pub fn check(&self, n: N) -> Option<String> {
        if let Some(min) = self.minimum {
            if n < min {
                return Some(format!("Value {n} is below minimum {min}"));
            }
        }
        if let Some(max) = self.maximum {
            if n > max {
                return Some(format!("Value {n} exceeds maximum {max}"));
            }
        }
        if let Some(allowed) = &self.one_of {
            if !allowed.iter().any(|a| *a == n) {
                return Some(format!("Value {n} is not one of: {}", super::list(allowed)));
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.minimum.is_none() && self.maximum.is_none() && self.one_of.is_none()
    }
}
