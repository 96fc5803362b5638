//! # Native column types
//!
//! A `NativeType` is the storage-level type of a column as captured in a
//! reflection snapshot: `String`, `Integer`, `DateTime`, and so on, plus
//! wrapper forms (`Decorated`) and a placeholder for types the extractor
//! could not resolve (`Unresolved`).
//!
//! Every concrete native type carries a [`TypeClass`], and each class knows
//! its own inheritance chain ordered from most to least specific. Downstream
//! classification and restriction rules walk that chain instead of probing a
//! live type hierarchy, so the fallback order is fixed at compile time and
//! identical on every run.

use serde::{Deserialize, Serialize};

/// Classification key for a native column type.
///
/// Mirrors the generic type lattice of a relational mapper: concrete classes
/// such as `Text` or `SmallInteger` sit below broader ones such as `String`
/// or `Integer`, with `Concatenable` as the widest string-like ancestor.
/// The engine root itself is deliberately absent; chain walks stop before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeClass {
    String,
    Text,
    Unicode,
    UnicodeText,
    Integer,
    SmallInteger,
    BigInteger,
    Numeric,
    Float,
    DateTime,
    Date,
    Time,
    Boolean,
    Enum,
    LargeBinary,
    Interval,
    Json,
    Uuid,
    Array,
    Concatenable,
}

impl TypeClass {
    /// Inheritance chain for this class, ordered from the class itself up to
    /// (but excluding) the generic engine root.
    ///
    /// The first element is always `self`, so an exact-match lookup and an
    /// ancestor-fallback lookup are a single walk over this slice.
    pub fn ancestors(self) -> &'static [TypeClass] {
        match self {
            Self::String => &[Self::String, Self::Concatenable],
            Self::Text => &[Self::Text, Self::String, Self::Concatenable],
            Self::Unicode => &[Self::Unicode, Self::String, Self::Concatenable],
            Self::UnicodeText => &[Self::UnicodeText, Self::Text, Self::String, Self::Concatenable],
            Self::Integer => &[Self::Integer],
            Self::SmallInteger => &[Self::SmallInteger, Self::Integer],
            Self::BigInteger => &[Self::BigInteger, Self::Integer],
            Self::Numeric => &[Self::Numeric],
            Self::Float => &[Self::Float, Self::Numeric],
            Self::DateTime => &[Self::DateTime],
            Self::Date => &[Self::Date],
            Self::Time => &[Self::Time],
            Self::Boolean => &[Self::Boolean],
            Self::Enum => &[Self::Enum, Self::String, Self::Concatenable],
            Self::LargeBinary => &[Self::LargeBinary],
            Self::Interval => &[Self::Interval],
            Self::Json => &[Self::Json],
            Self::Uuid => &[Self::Uuid],
            Self::Array => &[Self::Array, Self::Concatenable],
            Self::Concatenable => &[Self::Concatenable],
        }
    }

    /// Returns the class name as it appears in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Text => "Text",
            Self::Unicode => "Unicode",
            Self::UnicodeText => "UnicodeText",
            Self::Integer => "Integer",
            Self::SmallInteger => "SmallInteger",
            Self::BigInteger => "BigInteger",
            Self::Numeric => "Numeric",
            Self::Float => "Float",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Boolean => "Boolean",
            Self::Enum => "Enum",
            Self::LargeBinary => "LargeBinary",
            Self::Interval => "Interval",
            Self::Json => "Json",
            Self::Uuid => "Uuid",
            Self::Array => "Array",
            Self::Concatenable => "Concatenable",
        }
    }
}

impl std::fmt::Display for TypeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Native type of a column, captured once at snapshot-extraction time.
///
/// Serialized form is internally tagged by `class`, so a YAML descriptor
/// reads naturally:
///
/// ```yaml
/// type: { class: string, length: 50 }
/// ```
///
/// `Decorated` wraps a user-defined decorator around an underlying type and
/// classifies as whatever it wraps. `Unresolved` records a type the
/// extractor could not interpret; encountering one during schema generation
/// is a fatal error, never a silent skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum NativeType {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
    },
    Unicode {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
    },
    UnicodeText {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<u32>,
    },
    Integer,
    SmallInteger,
    BigInteger,
    Numeric,
    Float,
    DateTime,
    Date,
    Time,
    Boolean,
    Enum {
        values: Vec<String>,
    },
    LargeBinary,
    Interval,
    Json,
    Uuid,
    Array {
        item: Box<NativeType>,
    },
    Decorated {
        inner: Box<NativeType>,
    },
    Unresolved {
        type_name: String,
    },
}

impl NativeType {
    /// Strips decorator wrappers down to the underlying native type.
    ///
    /// Non-decorated types resolve to themselves. Nested decorators are
    /// unwrapped all the way down.
    pub fn resolved(&self) -> &NativeType {
        let mut ty = self;
        while let NativeType::Decorated { inner } = ty {
            ty = inner;
        }
        ty
    }

    /// Classification key for this type, or `None` for an unresolved
    /// placeholder. Decorators classify as the type they wrap.
    pub fn class(&self) -> Option<TypeClass> {
        match self.resolved() {
            Self::String { .. } => Some(TypeClass::String),
            Self::Text { .. } => Some(TypeClass::Text),
            Self::Unicode { .. } => Some(TypeClass::Unicode),
            Self::UnicodeText { .. } => Some(TypeClass::UnicodeText),
            Self::Integer => Some(TypeClass::Integer),
            Self::SmallInteger => Some(TypeClass::SmallInteger),
            Self::BigInteger => Some(TypeClass::BigInteger),
            Self::Numeric => Some(TypeClass::Numeric),
            Self::Float => Some(TypeClass::Float),
            Self::DateTime => Some(TypeClass::DateTime),
            Self::Date => Some(TypeClass::Date),
            Self::Time => Some(TypeClass::Time),
            Self::Boolean => Some(TypeClass::Boolean),
            Self::Enum { .. } => Some(TypeClass::Enum),
            Self::LargeBinary => Some(TypeClass::LargeBinary),
            Self::Interval => Some(TypeClass::Interval),
            Self::Json => Some(TypeClass::Json),
            Self::Uuid => Some(TypeClass::Uuid),
            Self::Array { .. } => Some(TypeClass::Array),
            Self::Decorated { .. } | Self::Unresolved { .. } => None,
        }
    }

    /// Declared character length, for the string-like types that carry one.
    pub fn length(&self) -> Option<u32> {
        match self.resolved() {
            Self::String { length }
            | Self::Text { length }
            | Self::Unicode { length }
            | Self::UnicodeText { length } => *length,
            _ => None,
        }
    }

    /// Allowed labels of an enumeration type.
    pub fn enum_values(&self) -> Option<&[String]> {
        match self.resolved() {
            Self::Enum { values } => Some(values),
            _ => None,
        }
    }

    /// Element type of an array column.
    pub fn item(&self) -> Option<&NativeType> {
        match self.resolved() {
            Self::Array { item } => Some(item),
            _ => None,
        }
    }

    /// True when this is the placeholder for a type the snapshot extractor
    /// could not resolve.
    pub fn is_unresolved(&self) -> bool {
        matches!(self.resolved(), Self::Unresolved { .. })
    }

    /// Name recorded for an unresolved placeholder type.
    pub fn unresolved_name(&self) -> Option<&str> {
        match self.resolved() {
            Self::Unresolved { type_name } => Some(type_name),
            _ => None,
        }
    }
}
