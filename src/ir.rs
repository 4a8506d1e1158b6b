// Strongly-typed IR for declared shapes. Immutable once built.

use indexmap::IndexMap;
use serde_json::Value;

use crate::constraints::{
    ArrayConstraints, FloatConstraints, IntegerConstraints, NoConstraints, ObjectOptions, StringConstraints,
};
use crate::error::TypeError;
use crate::path_de::options_with_path;

/// Deepest tree any constructor or derivation entry point will build.
pub const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind { String, Integer, Float, Boolean, Date, DateTime }

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Date => "date",
            PrimitiveKind::DateTime => "datetime",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticKind { Uuid, Email }

impl SemanticKind {
    pub fn name(self) -> &'static str {
        match self {
            SemanticKind::Uuid => "uuid",
            SemanticKind::Email => "email",
        }
    }

    /// Label used in "Invalid <label> format" messages.
    pub fn label(self) -> &'static str {
        match self {
            SemanticKind::Uuid => "UUID",
            SemanticKind::Email => "email",
        }
    }
}

/// A primitive together with the constraints its kind supports.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    String(StringConstraints),
    Integer(IntegerConstraints),
    Float(FloatConstraints),
    Boolean,
    Date,
    DateTime,
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::String(_) => PrimitiveKind::String,
            Primitive::Integer(_) => PrimitiveKind::Integer,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::Boolean => PrimitiveKind::Boolean,
            Primitive::Date => PrimitiveKind::Date,
            Primitive::DateTime => PrimitiveKind::DateTime,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub item: Box<TypeVariant>,
    pub constraints: ArrayConstraints,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    fields: IndexMap<String, Field>, // declaration order
    additional_properties: bool,
}

impl ObjectType {
    pub fn fields(&self) -> &IndexMap<String, Field> { &self.fields }
    pub fn field(&self, name: &str) -> Option<&Field> { self.fields.get(name) }
    pub fn additional_properties(&self) -> bool { self.additional_properties }
    pub fn is_strict(&self) -> bool { !self.additional_properties }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Primitive(Primitive),
    Semantic(SemanticKind),
    Array(ArrayType),
    Optional(Box<TypeVariant>),
    Object(ObjectType),
}

/// An immutable, recursively composable shape.
///
/// Only the constructors below produce one, so every tree in circulation has
/// consistent constraints and a depth of at most [`MAX_DEPTH`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeVariant {
    variant: Variant,
    depth: usize,
}

/// One declared object field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    ty: TypeVariant,
    required: bool,
    default: Option<Value>,
    description: Option<String>,
}

impl Field {
    /// Required unless `ty` is `Optional`. A default also lifts the
    /// requirement, see [`Field::is_required`].
    pub fn new(ty: TypeVariant) -> Self {
        let required = !ty.is_optional();
        Self { ty, required, default: None, description: None }
    }
    pub fn required(mut self, required: bool) -> Self { self.required = required; self }
    pub fn with_default(mut self, default: Value) -> Self { self.default = Some(default); self }
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn ty(&self) -> &TypeVariant { &self.ty }
    /// Whether input must carry this field. A field with a default never has
    /// to: coercion fills it in, so validation and schema output agree.
    pub fn is_required(&self) -> bool { self.required && self.default.is_none() }
    pub fn default(&self) -> Option<&Value> { self.default.as_ref() }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
}

impl From<TypeVariant> for Field {
    fn from(ty: TypeVariant) -> Self { Field::new(ty) }
}

// ------------------------------ Constructors ------------------------------ //

impl TypeVariant {
    fn leaf(variant: Variant) -> Self { Self { variant, depth: 1 } }

    fn nested(variant: Variant, child_depth: usize) -> Result<Self, TypeError> {
        let depth = child_depth + 1;
        if depth > MAX_DEPTH {
            tracing::debug!(depth, "rejecting type tree deeper than {MAX_DEPTH}");
            return Err(TypeError::TooDeep { max: MAX_DEPTH });
        }
        Ok(Self { variant, depth })
    }

    pub fn string(constraints: StringConstraints) -> Result<Self, TypeError> {
        constraints.check_consistent()?;
        Ok(Self::leaf(Variant::Primitive(Primitive::String(constraints))))
    }

    pub fn integer(constraints: IntegerConstraints) -> Result<Self, TypeError> {
        constraints.check_consistent("integer")?;
        Ok(Self::leaf(Variant::Primitive(Primitive::Integer(constraints))))
    }

    pub fn float(constraints: FloatConstraints) -> Result<Self, TypeError> {
        constraints.check_consistent("float")?;
        Ok(Self::leaf(Variant::Primitive(Primitive::Float(constraints))))
    }

    pub fn boolean() -> Self { Self::leaf(Variant::Primitive(Primitive::Boolean)) }
    pub fn date() -> Self { Self::leaf(Variant::Primitive(Primitive::Date)) }
    pub fn datetime() -> Self { Self::leaf(Variant::Primitive(Primitive::DateTime)) }
    pub fn uuid() -> Self { Self::leaf(Variant::Semantic(SemanticKind::Uuid)) }
    pub fn email() -> Self { Self::leaf(Variant::Semantic(SemanticKind::Email)) }

    /// Unconstrained string; shorthand used heavily by inference.
    pub fn any_string() -> Self {
        Self::leaf(Variant::Primitive(Primitive::String(StringConstraints::default())))
    }

    pub fn array(item: TypeVariant, constraints: ArrayConstraints) -> Result<Self, TypeError> {
        constraints.check_consistent()?;
        let child_depth = item.depth;
        Self::nested(Variant::Array(ArrayType { item: Box::new(item), constraints }), child_depth)
    }

    /// `Optional(Optional(x))` collapses to `Optional(x)`.
    pub fn optional(inner: TypeVariant) -> Result<Self, TypeError> {
        if inner.is_optional() {
            return Ok(inner);
        }
        let child_depth = inner.depth;
        Self::nested(Variant::Optional(Box::new(inner)), child_depth)
    }

    /// Build an object from `(name, field)` pairs, keeping their order.
    ///
    /// Fails on duplicate names and on defaults that do not coerce to their
    /// field's type.
    pub fn object<I, K, F>(fields: I, options: ObjectOptions) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: Into<Field>,
    {
        let mut map = IndexMap::<String, Field>::new();
        for (name, field) in fields {
            let name = name.into();
            let field = field.into();
            if let Some(default) = &field.default {
                if let Err(e) = crate::coerce::coerce(&field.ty, default) {
                    return Err(TypeError::InvalidDefault { field: name, reason: e.reason });
                }
            }
            if map.contains_key(&name) {
                return Err(TypeError::DuplicateField { field: name });
            }
            map.insert(name, field);
        }
        let child_depth = map.values().map(|f| f.ty.depth).max().unwrap_or(0);
        Self::nested(
            Variant::Object(ObjectType { fields: map, additional_properties: options.additional_properties }),
            child_depth,
        )
    }

    /// Build a primitive from a loosely-typed options bag. Keys the kind does
    /// not recognize are an error.
    pub fn primitive(kind: PrimitiveKind, options: &Value) -> Result<Self, TypeError> {
        let name = kind.name();
        match kind {
            PrimitiveKind::String => Self::string(options_with_path(name, options)?),
            PrimitiveKind::Integer => Self::integer(options_with_path(name, options)?),
            PrimitiveKind::Float => Self::float(options_with_path(name, options)?),
            PrimitiveKind::Boolean => {
                options_with_path::<NoConstraints>(name, options)?;
                Ok(Self::boolean())
            }
            PrimitiveKind::Date => {
                options_with_path::<NoConstraints>(name, options)?;
                Ok(Self::date())
            }
            PrimitiveKind::DateTime => {
                options_with_path::<NoConstraints>(name, options)?;
                Ok(Self::datetime())
            }
        }
    }

    /// Semantic kinds take no options; any key is an error.
    pub fn semantic(kind: SemanticKind, options: &Value) -> Result<Self, TypeError> {
        options_with_path::<NoConstraints>(kind.name(), options)?;
        Ok(Self::leaf(Variant::Semantic(kind)))
    }
}

// ------------------------------- Accessors -------------------------------- //

impl TypeVariant {
    pub fn variant(&self) -> &Variant { &self.variant }

    /// Number of nested levels, counting this one.
    pub fn depth(&self) -> usize { self.depth }

    pub fn is_optional(&self) -> bool { matches!(self.variant, Variant::Optional(_)) }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match &self.variant {
            Variant::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Name used as the target type of coercion errors.
    pub fn type_name(&self) -> String {
        match &self.variant {
            Variant::Primitive(p) => p.kind().name().to_string(),
            Variant::Semantic(k) => k.name().to_string(),
            Variant::Array(a) => format!("array<{}>", a.item.type_name()),
            Variant::Optional(inner) => format!("optional<{}>", inner.type_name()),
            Variant::Object(_) => "object".to_string(),
        }
    }
}

// ------------------------------- Operations ------------------------------- //

impl TypeVariant {
    pub fn validate(&self, value: &Value) -> crate::validate::ValidationResult {
        crate::validate::validate(self, value)
    }

    pub fn coerce(&self, value: &Value) -> Result<crate::value::TypedValue, crate::error::CoercionError> {
        crate::coerce::coerce(self, value)
    }

    pub fn to_schema(&self) -> crate::schema::SchemaDescription {
        crate::schema::to_schema(self)
    }
}
