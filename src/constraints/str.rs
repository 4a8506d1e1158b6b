use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::TypeError;

/// A compiled, unanchored regex. Equality is by source text.
#[derive(Clone, Debug)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, TypeError> {
        Regex::new(source).map(Pattern).map_err(|e| TypeError::InvalidConstraint {
            kind: "string",
            reason: format!("pattern '{source}' does not compile: {e}"),
        })
    }
    pub fn as_str(&self) -> &str { self.0.as_str() }
    pub fn is_match(&self, s: &str) -> bool { self.0.is_match(s) }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool { self.as_str() == other.as_str() }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Regex::new(&source).map(Pattern).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct StringConstraints {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    #[serde(rename = "enum")]
    pub one_of: Option<Vec<String>>,
}

impl StringConstraints {
    pub(crate) fn check_consistent(&self) -> Result<(), TypeError> {
        if let (Some(lo), Some(hi)) = (self.min_length, self.max_length) {
            if lo > hi {
                return Err(TypeError::InvalidConstraint {
                    kind: "string",
                    reason: format!("minLength {lo} is greater than maxLength {hi}"),
                });
            }
        }
        Ok(())
    }

    /// First failing constraint for `s`, if any. Length counts characters.
    pub fn check(&self, s: &str) -> Option<String> {
        let len = s.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                return Some(format!("String length {len} is below minimum {min}"));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Some(format!("String length {len} exceeds maximum {max}"));
            }
        }
        if let Some(rx) = &self.pattern {
            if !rx.is_match(s) {
                return Some(format!("String '{s}' does not match pattern '{rx}'"));
            }
        }
        if let Some(allowed) = &self.one_of {
            if !allowed.iter().any(|a| a == s) {
                return Some(format!("Value '{s}' is not one of: {}", super::list(allowed)));
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool { *self == Self::default() }
}
