//! # Type Kinds
//!
//! The closed set of built-in kinds plus [`TypeKind::Custom`] for names
//! resolved through the [`crate::TypeRegistry`]. Every dispatch over a kind
//! is an exhaustive `match`: adding a kind forces every consumer to handle
//! it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Built-in kinds, in catalog order.
pub const BUILTIN_KINDS: [TypeKind; 23] = [
    TypeKind::Text,
    TypeKind::Textarea,
    TypeKind::Int,
    TypeKind::UInt,
    TypeKind::Float,
    TypeKind::Double,
    TypeKind::Boolean,
    TypeKind::Color,
    TypeKind::Username,
    TypeKind::Email,
    TypeKind::Password,
    TypeKind::Token,
    TypeKind::Url,
    TypeKind::Permalink,
    TypeKind::Date,
    TypeKind::DateTime,
    TypeKind::Regexp,
    TypeKind::UnixTimestamp,
    TypeKind::Enum,
    TypeKind::Json,
    TypeKind::JsonArray,
    TypeKind::Array,
    TypeKind::ArrayCsv,
];

/// The type of a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Single-line text.
    Text,
    /// Multi-line text.
    Textarea,
    /// Signed integer.
    Int,
    /// Unsigned integer (floor of 0 unless `min` overrides it).
    UInt,
    /// Floating point number.
    Float,
    /// Double precision floating point number.
    Double,
    /// Boolean.
    Boolean,
    /// `#` followed by 6 or 8 hex digits.
    Color,
    /// Letters, digits, underscore and dot; 3 to 64 characters.
    Username,
    /// Email address.
    Email,
    /// Accepted as-is.
    Password,
    /// Letters, digits and underscore; 3 to 48 characters.
    Token,
    /// Absolute URL.
    Url,
    /// Letters, digits and underscore; 3 to 32 characters.
    Permalink,
    /// SQL date-time string.
    Date,
    /// SQL date-time string.
    DateTime,
    /// Text matched against the field's own pattern.
    Regexp,
    /// Unsigned integer seconds, shifted by the configured UTC offset.
    UnixTimestamp,
    /// One of an explicit set of values.
    Enum,
    /// A JSON document.
    Json,
    /// A list of JSON documents.
    JsonArray,
    /// A list of raw values.
    Array,
    /// Comma separated list; each element validated as `subtype`.
    ArrayCsv,
    /// A type resolved through the custom type registry.
    Custom(String),
}

impl TypeKind {
    /// Canonical wire name.
    pub fn name(&self) -> &str {
        match self {
            TypeKind::Text => "text",
            TypeKind::Textarea => "textarea",
            TypeKind::Int => "int",
            TypeKind::UInt => "uint",
            TypeKind::Float => "float",
            TypeKind::Double => "double",
            TypeKind::Boolean => "boolean",
            TypeKind::Color => "color",
            TypeKind::Username => "username",
            TypeKind::Email => "email",
            TypeKind::Password => "password",
            TypeKind::Token => "token",
            TypeKind::Url => "url",
            TypeKind::Permalink => "permalink",
            TypeKind::Date => "date",
            TypeKind::DateTime => "datetime",
            TypeKind::Regexp => "regexp",
            TypeKind::UnixTimestamp => "unix_timestamp",
            TypeKind::Enum => "enum",
            TypeKind::Json => "json",
            TypeKind::JsonArray => "json_array",
            TypeKind::Array => "array",
            TypeKind::ArrayCsv => "array_csv",
            TypeKind::Custom(name) => name,
        }
    }

    /// Look up a built-in kind by wire name.
    pub fn builtin(name: &str) -> Option<TypeKind> {
        BUILTIN_KINDS.iter().find(|k| k.name() == name).cloned()
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, TypeKind::Custom(_))
    }

    /// Whether a custom type registered under this kind's name takes
    /// precedence over the built-in rule. Only the text kinds are
    /// overridable.
    pub fn is_overridable(&self) -> bool {
        matches!(self, TypeKind::Text | TypeKind::Textarea)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeKind {
    type Err = std::convert::Infallible;

    /// Built-in names map to their kind; anything else is a custom type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TypeKind::builtin(s).unwrap_or_else(|| TypeKind::Custom(s.to_string())))
    }
}

impl From<&str> for TypeKind {
    fn from(s: &str) -> Self {
        TypeKind::builtin(s).unwrap_or_else(|| TypeKind::Custom(s.to_string()))
    }
}

impl Serialize for TypeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TypeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(TypeKind::from(name.as_str()))
    }
}
