use serde::Deserialize;

use crate::error::TypeError;

/// Object-level policy. Strict (`additional_properties: false`) unless asked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ObjectOptions {
    pub additional_properties: bool,
}

impl ObjectOptions {
    pub fn strict() -> Self { Self { additional_properties: false } }
    pub fn permissive() -> Self { Self { additional_properties: true } }

    pub fn from_options(options: &serde_json::Value) -> Result<Self, TypeError> {
        crate::path_de::options_with_path("object", options)
    }
}

/// One message for all undeclared keys, listing what is allowed.
pub(crate) fn unexpected_fields_message<'a>(
    unexpected: &[&str],
    allowed: impl Iterator<Item = &'a String>,
) -> String {
    let allowed = allowed.map(|s| s.as_str()).collect::<Vec<_>>();
    format!(
        "Unexpected fields: {}. Allowed fields: {}",
        unexpected.join(", "),
        allowed.join(", ")
    )
}
