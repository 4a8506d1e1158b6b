use serde::Deserialize;

use crate::error::TypeError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ArrayConstraints {
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl ArrayConstraints {
    pub fn from_options(options: &serde_json::Value) -> Result<Self, TypeError> {
        crate::path_de::options_with_path("array", options)
    }

    pub(crate) fn check_consistent(&self) -> Result<(), TypeError> {
        if let (Some(lo), Some(hi)) = (self.min_items, self.max_items) {
            if lo > hi {
                return Err(TypeError::InvalidConstraint {
                    kind: "array",
                    reason: format!("minItems {lo} is greater than maxItems {hi}"),
                });
            }
        }
        Ok(())
    }

    pub fn check(&self, len: usize) -> Option<String> {
        match (self.min_items, self.max_items) {
            (Some(min), _) if len < min => Some(format!("Array length {len} is below minimum {min}")),
            (_, Some(max)) if len > max => Some(format!("Array length {len} exceeds maximum {max}")),
            _ => None,
        }
    }
}
