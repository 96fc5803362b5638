//! # Type classification
//!
//! Maps a column's native type to one of the seven JSON Schema draft-04
//! primitive type names. Lookup is an ordered walk over the native type's
//! inheritance chain: exact class first, then each ancestor from most to
//! least specific. The fallback matters because concrete column types vary
//! by dialect but descend from a small set of generic classes.

use std::collections::BTreeMap;

use tabula_model::{NativeType, TypeClass};

use crate::error::SchemaError;

/// The seven primitive types JSON Schema draft-04 defines for values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Array,
    Boolean,
    Integer,
    Number,
    Null,
    Object,
    String,
}

impl Primitive {
    /// The name used in a schema's `type` keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Null => "null",
            Self::Object => "object",
            Self::String => "string",
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default classification table.
///
/// Notable choices: `BigInteger` maps to `string` because 64-bit values do
/// not survive consumers that read JSON numbers as doubles; date and time
/// types map to `string` and pick up their `format` keyword from the
/// restriction rules; `Concatenable` maps to `array` so dialect array types
/// classify through their shared ancestor. Binary and interval types have
/// no mapping at all and fail classification.
pub fn default_mapping() -> BTreeMap<TypeClass, Primitive> {
    BTreeMap::from([
        (TypeClass::Json, Primitive::Object),
        (TypeClass::Uuid, Primitive::String),
        (TypeClass::String, Primitive::String),
        (TypeClass::Text, Primitive::String),
        (TypeClass::Integer, Primitive::Integer),
        (TypeClass::SmallInteger, Primitive::Integer),
        (TypeClass::BigInteger, Primitive::String),
        (TypeClass::Numeric, Primitive::Number),
        (TypeClass::Float, Primitive::Number),
        (TypeClass::DateTime, Primitive::String),
        (TypeClass::Date, Primitive::String),
        (TypeClass::Time, Primitive::String),
        (TypeClass::Boolean, Primitive::Boolean),
        (TypeClass::Unicode, Primitive::String),
        (TypeClass::Concatenable, Primitive::Array),
        (TypeClass::UnicodeText, Primitive::String),
        (TypeClass::Enum, Primitive::String),
    ])
}

/// Resolves native column types to schema primitives.
#[derive(Debug, Clone)]
pub struct Classifier {
    mapping: BTreeMap<TypeClass, Primitive>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            mapping: default_mapping(),
        }
    }
}

impl Classifier {
    /// Classifier over a caller-supplied table.
    pub fn new(mapping: BTreeMap<TypeClass, Primitive>) -> Self {
        Self { mapping }
    }

    /// Adds or replaces one table entry.
    pub fn with_entry(mut self, class: TypeClass, primitive: Primitive) -> Self {
        self.mapping.insert(class, primitive);
        self
    }

    /// Returns the matched class and its primitive for a native type.
    ///
    /// Decorator wrappers are stripped first, so a decorated type classifies
    /// exactly like the type it wraps. The matched class may be an ancestor
    /// of the type's own class; restriction rules walk the chain from that
    /// matched class.
    pub fn classify(&self, native: &NativeType) -> Result<(TypeClass, Primitive), SchemaError> {
        let resolved = native.resolved();
        let Some(class) = resolved.class() else {
            return Err(SchemaError::UnmappedType {
                type_name: resolved.unresolved_name().unwrap_or("unresolved").to_string(),
            });
        };
        for ancestor in class.ancestors() {
            if let Some(primitive) = self.mapping.get(ancestor) {
                return Ok((*ancestor, *primitive));
            }
        }
        Err(SchemaError::UnmappedType {
            type_name: class.as_str().to_string(),
        })
    }
}
