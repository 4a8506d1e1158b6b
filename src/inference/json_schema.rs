//! Lower a JSON Schema document into a type tree.
//!
//! Supported vocabulary: `type` (a name, or `[name, "null"]`), `format`
//! (`uuid`, `email`, `date`, `date-time`), the constraint keywords each kind
//! understands, `items`, `properties`, `required`, `additionalProperties`,
//! `nullable`, `default`, `description`, and local `$ref` (`#/...`).
//! Unknown formats are annotations and fall back to a plain string.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::constraints::{ArrayConstraints, FloatConstraints, IntegerConstraints, ObjectOptions, StringConstraints};
use crate::error::TypeError;
use crate::ir::{Field, MAX_DEPTH, TypeVariant};
use crate::path_de::{options_with_path, pick};
use crate::value::json_kind;

use super::FieldFilter;

const STRING_KEYS: &[&str] = &["minLength", "maxLength", "pattern", "enum"];
const NUMBER_KEYS: &[&str] = &["minimum", "maximum", "enum"];
const ARRAY_KEYS: &[&str] = &["minItems", "maxItems"];

pub fn from_json_schema(doc: &Value, filter: &FieldFilter) -> Result<TypeVariant, TypeError> {
    let Some(root) = doc.as_object() else {
        return Err(TypeError::NonObjectRoot { found: json_kind(doc) });
    };
    let mut lowering = Lowering { doc, refs: Vec::new() };
    let root = lowering.resolve(root, "#")?;
    match type_name(root, "#")? {
        Some(SchemaType::Object) => {}
        Some(other) => return Err(TypeError::NonObjectRoot { found: other.json_name() }),
        None if root.contains_key("properties") => {}
        None => return Err(TypeError::NonObjectRoot { found: "untyped schema" }),
    }
    let (fields, options) = lowering.object_parts(root, "#", 0)?;
    super::finish_root(fields, options, filter)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaType { String, Integer, Number, Boolean, Array, Object }

impl SchemaType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "string" => SchemaType::String,
            "integer" => SchemaType::Integer,
            "number" => SchemaType::Number,
            "boolean" => SchemaType::Boolean,
            "array" => SchemaType::Array,
            "object" => SchemaType::Object,
            _ => return None,
        })
    }

    fn json_name(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
        }
    }
}

/// The non-null member of `type`, if declared.
fn type_name(node: &Map<String, Value>, path: &str) -> Result<Option<SchemaType>, TypeError> {
    let unsupported = |reason: String| TypeError::UnsupportedSchema { path: path.to_string(), reason };
    let name = match node.get("type") {
        None => return Ok(None),
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Array(xs)) => {
            let non_null = xs.iter().filter(|x| x.as_str() != Some("null")).collect::<Vec<_>>();
            match non_null.as_slice() {
                [one] => one.as_str().ok_or_else(|| unsupported(format!("type entry {one} is not a string")))?,
                [] => return Err(unsupported("a type that only admits null is not supported".to_string())),
                _ => return Err(unsupported(format!("union types are not supported: {}", Value::Array(xs.clone())))),
            }
        }
        Some(other) => return Err(unsupported(format!("`type` must be a string or array, got {}", json_kind(other)))),
    };
    SchemaType::parse(name).map(Some).ok_or_else(|| unsupported(format!("unknown type '{name}'")))
}

/// `type: [T, "null"]` or `nullable: true`.
fn is_nullable(node: &Map<String, Value>) -> bool {
    let listed = node
        .get("type")
        .and_then(Value::as_array)
        .is_some_and(|xs| xs.iter().any(|x| x.as_str() == Some("null")));
    listed || node.get("nullable").and_then(Value::as_bool).unwrap_or(false)
}

struct Lowering<'a> {
    doc: &'a Value,
    /// `$ref`s currently being expanded, innermost last.
    refs: Vec<String>,
}

impl<'a> Lowering<'a> {
    /// Follow `$ref` chains to a concrete node.
    fn resolve(&self, node: &'a Map<String, Value>, path: &str) -> Result<&'a Map<String, Value>, TypeError> {
        let mut node = node;
        let mut hops = 0;
        while let Some(reference) = node.get("$ref") {
            let reference = reference.as_str().ok_or_else(|| TypeError::UnsupportedSchema {
                path: path.to_string(),
                reason: "`$ref` must be a string".to_string(),
            })?;
            hops += 1;
            if hops > MAX_DEPTH {
                return Err(TypeError::Cyclic { reference: reference.to_string() });
            }
            node = self.lookup(reference, path)?;
        }
        Ok(node)
    }

    fn lookup(&self, reference: &str, path: &str) -> Result<&'a Map<String, Value>, TypeError> {
        let pointer = reference.strip_prefix('#').ok_or_else(|| TypeError::UnsupportedSchema {
            path: path.to_string(),
            reason: format!("only local references are supported, got '{reference}'"),
        })?;
        self.doc
            .pointer(pointer)
            .and_then(Value::as_object)
            .ok_or_else(|| TypeError::UnsupportedSchema {
                path: path.to_string(),
                reason: format!("reference '{reference}' does not resolve to a schema object"),
            })
    }

    fn lower(&mut self, node: &'a Map<String, Value>, path: &str, depth: usize) -> Result<TypeVariant, TypeError> {
        if depth >= MAX_DEPTH {
            return Err(TypeError::TooDeep { max: MAX_DEPTH });
        }
        // `$ref` expansion is tracked so a loop is reported instead of recursing forever.
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            if self.refs.iter().any(|r| r == reference) {
                tracing::debug!(reference, "cyclic $ref");
                return Err(TypeError::Cyclic { reference: reference.to_string() });
            }
            self.refs.push(reference.to_string());
            let target = self.lookup(reference, path)?;
            let out = self.lower(target, reference, depth);
            self.refs.pop();
            let ty = out?;
            return if node.get("nullable").and_then(Value::as_bool).unwrap_or(false) {
                TypeVariant::optional(ty)
            } else {
                Ok(ty)
            };
        }

        let kind = match type_name(node, path)? {
            Some(kind) => kind,
            None if node.contains_key("properties") => SchemaType::Object,
            None if node.contains_key("items") => SchemaType::Array,
            None => {
                return Err(TypeError::UnsupportedSchema {
                    path: path.to_string(),
                    reason: "missing `type`".to_string(),
                });
            }
        };

        let ty = match kind {
            SchemaType::String => lower_string(node)?,
            SchemaType::Integer => TypeVariant::integer(options_with_path::<IntegerConstraints>("integer", &pick(node, NUMBER_KEYS))?)?,
            SchemaType::Number => TypeVariant::float(options_with_path::<FloatConstraints>("float", &pick(node, NUMBER_KEYS))?)?,
            SchemaType::Boolean => TypeVariant::boolean(),
            SchemaType::Array => {
                let item = match node.get("items") {
                    None => TypeVariant::any_string(),
                    Some(Value::Object(items)) => self.lower(items, &format!("{path}/items"), depth + 1)?,
                    Some(other) => {
                        return Err(TypeError::UnsupportedSchema {
                            path: format!("{path}/items"),
                            reason: format!("`items` must be a schema object, got {}", json_kind(other)),
                        });
                    }
                };
                let constraints = ArrayConstraints::from_options(&pick(node, ARRAY_KEYS))?;
                TypeVariant::array(item, constraints)?
            }
            SchemaType::Object => {
                let (fields, options) = self.object_parts(node, path, depth)?;
                TypeVariant::object(fields, options)?
            }
        };

        if is_nullable(node) { TypeVariant::optional(ty) } else { Ok(ty) }
    }

    fn object_parts(
        &mut self,
        node: &'a Map<String, Value>,
        path: &str,
        depth: usize,
    ) -> Result<(IndexMap<String, Field>, ObjectOptions), TypeError> {
        let required = match node.get("required") {
            None => Vec::new(),
            Some(Value::Array(xs)) => xs.iter().filter_map(Value::as_str).collect::<Vec<_>>(),
            Some(other) => {
                return Err(TypeError::UnsupportedSchema {
                    path: format!("{path}/required"),
                    reason: format!("`required` must be an array, got {}", json_kind(other)),
                });
            }
        };

        let properties = match node.get("properties") {
            None => None,
            Some(Value::Object(m)) => Some(m),
            Some(other) => {
                return Err(TypeError::UnsupportedSchema {
                    path: format!("{path}/properties"),
                    reason: format!("`properties` must be an object, got {}", json_kind(other)),
                });
            }
        };

        let mut fields = IndexMap::with_capacity(properties.map_or(0, Map::len));
        for (name, prop) in properties.into_iter().flatten() {
            let Some(prop) = prop.as_object() else {
                return Err(TypeError::NotATypeDeclaration {
                    field: name.clone(),
                    reason: format!("expected a schema object, got {}", json_kind(prop)),
                });
            };
            let prop_path = format!("{path}/properties/{name}");
            let mut ty = self.lower(prop, &prop_path, depth + 1)?;
            let is_required = required.contains(&name.as_str());
            if !is_required {
                ty = TypeVariant::optional(ty)?;
            }
            let mut field = Field::new(ty).required(is_required);
            if let Some(d) = prop.get("description").and_then(Value::as_str) {
                field = field.with_description(d);
            }
            if let Some(d) = prop.get("default") {
                field = field.with_default(d.clone());
            }
            fields.insert(name.clone(), field);
        }

        // JSON Schema treats a missing keyword as permissive; this engine is strict unless told.
        let additional_properties = match node.get("additionalProperties") {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        };
        Ok((fields, ObjectOptions { additional_properties }))
    }
}

fn lower_string(node: &Map<String, Value>) -> Result<TypeVariant, TypeError> {
    match node.get("format").and_then(Value::as_str) {
        Some("uuid") => Ok(TypeVariant::uuid()),
        Some("email") => Ok(TypeVariant::email()),
        Some("date") => Ok(TypeVariant::date()),
        Some("date-time") => Ok(TypeVariant::datetime()),
        _ => TypeVariant::string(options_with_path::<StringConstraints>("string", &pick(node, STRING_KEYS))?),
    }
}
