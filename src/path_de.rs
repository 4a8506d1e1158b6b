use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::TypeError;

/// Deserialize a loosely-typed options bag into a per-kind constraint struct,
/// with JSON-path context in the error.
///
/// `null` is read as an empty bag. Unknown keys are rejected by the target
/// struct (`#[serde(deny_unknown_fields)]`), so a typo such as `minLenght`
/// fails here instead of being ignored.
pub fn options_with_path<T: DeserializeOwned>(kind: &'static str, options: &Value) -> Result<T, TypeError> {
    let empty = Value::Object(Map::new());
    let source = if options.is_null() { &empty } else { options };
    match serde_path_to_error::deserialize::<_, T>(source) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(TypeError::InvalidOptions { kind, path, reason: err.into_inner().to_string() })
        }
    }
}

/// Copy only the listed keys of a schema node into a fresh options bag.
pub(crate) fn pick(node: &Map<String, Value>, keys: &[&str]) -> Value {
    let picked = keys
        .iter()
        .filter_map(|k| node.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect::<Map<_, _>>();
    Value::Object(picked)
}
