//! # Field Specifications
//!
//! A [`FieldSpec`] is the authoring form of one schema entry: a kind plus
//! constraints and flags, assembled with a builder. Schema construction
//! compiles each spec into a [`CompiledField`], which is where every
//! consistency rule is enforced. A field that compiles can never raise a
//! configuration error during validation, except for custom types, which
//! are resolved against the registry at validation time (see
//! [`crate::Schema::check_custom_types`] to surface those at startup).

use coerce_core::{ConfigurationError, Value};
use regex::Regex;

use crate::kind::TypeKind;

/// One field's type, constraints and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field kind.
    pub kind: TypeKind,
    /// Absence is reported as a missing parameter.
    pub required: bool,
    /// Written to the output when the field is absent and not required.
    pub default: Option<Value>,
    /// Lower bound: value for numbers, length for text, element count for arrays.
    pub min: Option<f64>,
    /// Upper bound, same interpretation as `min`.
    pub max: Option<f64>,
    /// Pattern for the `regexp` kind.
    pub regex: Option<String>,
    /// Allowed values for the `enum` kind.
    pub enum_values: Option<Vec<Value>>,
    /// Element kind for `array_csv`. Defaults to text.
    pub subtype: Option<TypeKind>,
    /// Skip markup stripping and sanitization for text kinds.
    pub raw: bool,
}

impl FieldSpec {
    pub fn new(kind: impl Into<TypeKind>) -> Self {
        Self {
            kind: kind.into(),
            required: false,
            default: None,
            min: None,
            max: None,
            regex: None,
            enum_values: None,
            subtype: None,
            raw: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn subtype(mut self, kind: impl Into<TypeKind>) -> Self {
        self.subtype = Some(kind.into());
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Element kind of an `array_csv` field.
    pub fn element_kind(&self) -> TypeKind {
        self.subtype.clone().unwrap_or(TypeKind::Text)
    }

    /// Spec applied to each element of an `array_csv` field.
    ///
    /// Elements inherit the pattern, allowed values and raw flag of the
    /// outer field, so `array_csv` of `enum` or `regexp` is expressible.
    /// Bounds are not inherited.
    fn element_spec(&self) -> FieldSpec {
        FieldSpec {
            kind: self.element_kind(),
            required: false,
            default: None,
            min: None,
            max: None,
            regex: self.regex.clone(),
            enum_values: self.enum_values.clone(),
            subtype: None,
            raw: self.raw,
        }
    }

    /// Check internal consistency and compile patterns.
    pub(crate) fn compile(self, field: &str) -> Result<CompiledField, ConfigurationError> {
        if std::iter::once(&self.kind)
            .chain(self.subtype.as_ref())
            .any(|kind| kind.name().is_empty())
        {
            return Err(ConfigurationError::EmptyTypeName);
        }

        if self.subtype.is_some() && self.kind != TypeKind::ArrayCsv {
            return Err(ConfigurationError::SubtypeWithoutCsv {
                field: field.to_string(),
                kind: self.kind.to_string(),
            });
        }

        for (bound, value) in [("min", self.min), ("max", self.max)] {
            if let Some(value) = value.filter(|v| !v.is_finite()) {
                return Err(ConfigurationError::NonFiniteBound {
                    field: field.to_string(),
                    bound,
                    value,
                });
            }
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(ConfigurationError::InvalidBounds {
                    field: field.to_string(),
                    min,
                    max,
                });
            }
        }

        let mut pattern = None;
        let mut element = None;

        match &self.kind {
            TypeKind::Enum => {
                if self.enum_values.as_ref().map_or(true, Vec::is_empty) {
                    return Err(ConfigurationError::MissingEnumValues {
                        field: field.to_string(),
                    });
                }
            }
            TypeKind::Regexp => {
                let source = self.regex.as_deref().ok_or_else(|| {
                    ConfigurationError::MissingRegex {
                        field: field.to_string(),
                    }
                })?;
                let compiled =
                    Regex::new(source).map_err(|e| ConfigurationError::InvalidRegex {
                        field: field.to_string(),
                        reason: e.to_string(),
                    })?;
                pattern = Some(compiled);
            }
            TypeKind::ArrayCsv => {
                if self.element_kind() == TypeKind::ArrayCsv {
                    return Err(ConfigurationError::NestedCsv {
                        field: field.to_string(),
                    });
                }
                element = Some(Box::new(self.element_spec().compile(field)?));
            }
            _ => {}
        }

        Ok(CompiledField {
            spec: self,
            pattern,
            element,
        })
    }
}

/// A field spec that passed construction checks.
#[derive(Debug, Clone)]
pub struct CompiledField {
    spec: FieldSpec,
    pattern: Option<Regex>,
    element: Option<Box<CompiledField>>,
}

impl CompiledField {
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn kind(&self) -> &TypeKind {
        &self.spec.kind
    }

    /// Compiled pattern of a `regexp` field.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Element spec of an `array_csv` field.
    pub fn element(&self) -> Option<&CompiledField> {
        self.element.as_deref()
    }
}

/// A schema entry: either a bare marker (sanitized text, no constraints)
/// or a typed field.
#[derive(Debug, Clone)]
pub enum FieldEntry {
    /// Field accepted as sanitized text. Never required, no default.
    Marker,
    /// Field with a full specification.
    Typed(CompiledField),
}

impl FieldEntry {
    /// The compiled spec, if any.
    pub fn typed(&self) -> Option<&CompiledField> {
        match self {
            FieldEntry::Marker => None,
            FieldEntry::Typed(field) => Some(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_without_values_is_rejected() {
        let err = FieldSpec::new(TypeKind::Enum).compile("status").unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::MissingEnumValues {
                field: "status".into()
            }
        );

        let empty: Vec<Value> = Vec::new();
        let err = FieldSpec::new(TypeKind::Enum)
            .values(empty)
            .compile("status")
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingEnumValues { .. }));
    }

    #[test]
    fn regexp_requires_a_compilable_pattern() {
        let err = FieldSpec::new(TypeKind::Regexp).compile("code").unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingRegex { .. }));

        let err = FieldSpec::new(TypeKind::Regexp)
            .pattern("([a-z")
            .compile("code")
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidRegex { .. }));

        let field = FieldSpec::new(TypeKind::Regexp)
            .pattern("^[A-Z]{2}$")
            .compile("code")
            .unwrap();
        assert!(field.pattern().unwrap().is_match("GR"));
    }

    #[test]
    fn csv_subtype_defaults_to_text() {
        let field = FieldSpec::new(TypeKind::ArrayCsv).compile("tags").unwrap();
        assert_eq!(field.element().unwrap().kind(), &TypeKind::Text);
    }

    #[test]
    fn csv_elements_inherit_enum_values() {
        let field = FieldSpec::new(TypeKind::ArrayCsv)
            .subtype(TypeKind::Enum)
            .values(["a", "b"])
            .compile("letters")
            .unwrap();
        let element = field.element().unwrap();
        assert_eq!(element.kind(), &TypeKind::Enum);
        assert_eq!(element.spec().enum_values.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn nested_csv_is_rejected() {
        let err = FieldSpec::new(TypeKind::ArrayCsv)
            .subtype(TypeKind::ArrayCsv)
            .compile("grid")
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::NestedCsv { .. }));
    }

    #[test]
    fn subtype_outside_csv_is_rejected() {
        let err = FieldSpec::new(TypeKind::Array)
            .subtype(TypeKind::Int)
            .compile("ids")
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::SubtypeWithoutCsv { .. }));
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        let err = FieldSpec::new(TypeKind::Int)
            .min(f64::NAN)
            .compile("n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::NonFiniteBound { bound: "min", .. }
        ));

        let err = FieldSpec::new(TypeKind::Text)
            .max(f64::INFINITY)
            .compile("title")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::NonFiniteBound { bound: "max", .. }
        ));
    }

    #[test]
    fn empty_kind_names_are_rejected() {
        let err = FieldSpec::new("").compile("f").unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyTypeName);

        let err = FieldSpec::new(TypeKind::ArrayCsv)
            .subtype("")
            .compile("f")
            .unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyTypeName);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = FieldSpec::new(TypeKind::Int)
            .min(10.0)
            .max(1.0)
            .compile("n")
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidBounds { .. }));
    }
}
