//! # Coercion Engine
//!
//! Walks a [`Schema`] against an input [`Record`], coercing each field
//! according to its kind, and decides the outcome once every field has
//! been attempted.
//!
//! ## Algorithm
//!
//! For each field, in schema order:
//!
//! 1. Absent (or null): required → missing; else default → written; else
//!    skipped.
//! 2. Bare marker: sanitized text, no constraints.
//! 3. Typed: dispatch on the kind. A failure marks the field incorrect and
//!    the walk continues with the next field.
//!
//! `array_csv` fields re-enter the same walk once per element, with a
//! single-field schema of the element kind. Recursion is bounded by
//! [`MAX_NESTING_DEPTH`].
//!
//! ## Failure Policy
//!
//! Coercion happens on a copy of the input. On success the copy replaces
//! the caller's record; on any error the caller's record is left exactly
//! as it was, so a partially coerced slot can never be mistaken for a
//! validated one.
//!
//! Configuration errors (an unregistered custom type) abort the walk
//! immediately: they are schema bugs, not bad input.

use coerce_core::{CoerceError, ConfigurationError, EmailPolicy, EngineConfig, Record, Value};

use crate::catalog;
use crate::field::{CompiledField, FieldEntry, FieldSpec};
use crate::kind::TypeKind;
use crate::registry::TypeRegistry;
use crate::report::Report;
use crate::sanitize::sanitize_string;
use crate::schema::Schema;

/// How many times the walk may re-enter itself for `array_csv` elements.
pub const MAX_NESTING_DEPTH: usize = 1;

/// Result of coercing one present field.
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Accept(Value),
    Reject,
}

impl Outcome {
    fn from_result<T>(result: Result<T, CoerceError>, wrap: impl FnOnce(T) -> Value) -> Self {
        match result {
            Ok(v) => Outcome::Accept(wrap(v)),
            Err(_) => Outcome::Reject,
        }
    }
}

/// Borrowed schema entry, so element specs can be walked without building
/// a temporary [`Schema`].
#[derive(Clone, Copy)]
enum EntryRef<'s> {
    Marker,
    Typed(&'s CompiledField),
}

impl<'s> From<&'s FieldEntry> for EntryRef<'s> {
    fn from(entry: &'s FieldEntry) -> Self {
        match entry {
            FieldEntry::Marker => EntryRef::Marker,
            FieldEntry::Typed(field) => EntryRef::Typed(field),
        }
    }
}

/// Validates records against schemas with a given registry and configuration.
#[derive(Debug, Clone, Copy)]
pub struct Coercer<'r> {
    registry: &'r TypeRegistry,
    config: EngineConfig,
}

impl Coercer<'static> {
    /// Coercer backed by the process-wide registry.
    pub fn global(config: EngineConfig) -> Self {
        Self::new(TypeRegistry::global(), config)
    }
}

impl<'r> Coercer<'r> {
    pub fn new(registry: &'r TypeRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate `input` in place. On success every schema field holds its
    /// coerced value; on error `input` is unchanged.
    pub fn validate(&self, input: &mut Record, schema: &Schema) -> Result<(), CoerceError> {
        *input = self.coerce(input, schema)?;
        Ok(())
    }

    /// Validate `input` and return the coerced copy.
    pub fn coerce(&self, input: &Record, schema: &Schema) -> Result<Record, CoerceError> {
        let (record, report) = self.collect(input, schema)?;
        if !report.is_clean() {
            tracing::debug!(
                schema = schema.name(),
                incorrect = ?report.incorrect(),
                missing = ?report.missing(),
                "validation failed"
            );
        }
        report.decide(record)
    }

    /// Run the collect phase only: the coerced copy plus both failure lists,
    /// without applying the decision rule.
    pub fn collect(
        &self,
        input: &Record,
        schema: &Schema,
    ) -> Result<(Record, Report), ConfigurationError> {
        self.walk(
            input,
            schema.iter().map(|(name, entry)| (name, EntryRef::from(entry))),
            0,
        )
    }

    fn walk<'s, I>(
        &self,
        input: &Record,
        entries: I,
        depth: usize,
    ) -> Result<(Record, Report), ConfigurationError>
    where
        I: IntoIterator<Item = (&'s str, EntryRef<'s>)>,
    {
        let mut output = input.clone();
        let mut report = Report::new();

        for (name, entry) in entries {
            let raw = match input.get(name) {
                Some(value) if !value.is_null() => value,
                _ => {
                    if let EntryRef::Typed(field) = entry {
                        let spec = field.spec();
                        if spec.required {
                            report.mark_missing(name);
                        } else if let Some(default) = &spec.default {
                            output.insert(name.to_string(), default.clone());
                        }
                    }
                    continue;
                }
            };

            let outcome = match entry {
                EntryRef::Marker => marker(raw),
                EntryRef::Typed(field) => self.coerce_field(name, field, raw, depth)?,
            };

            match outcome {
                Outcome::Accept(value) => {
                    tracing::trace!(field = name, "accepted");
                    output.insert(name.to_string(), value);
                }
                Outcome::Reject => {
                    tracing::debug!(field = name, "rejected");
                    report.mark_incorrect(name);
                }
            }
        }

        Ok((output, report))
    }

    fn coerce_field(
        &self,
        name: &str,
        field: &CompiledField,
        raw: &Value,
        depth: usize,
    ) -> Result<Outcome, ConfigurationError> {
        let spec = field.spec();

        let outcome = match &spec.kind {
            TypeKind::Int => integer(raw, spec.min, spec.max, name),
            TypeKind::UInt => integer(raw, Some(spec.min.unwrap_or(0.0)), spec.max, name),
            TypeKind::UnixTimestamp => {
                match integer(raw, Some(spec.min.unwrap_or(0.0)), spec.max, name) {
                    Outcome::Accept(Value::Int(seconds)) => Outcome::Accept(Value::Int(
                        seconds.saturating_add(self.config.timezone_offset_seconds()),
                    )),
                    other => other,
                }
            }
            TypeKind::Float | TypeKind::Double => floating(raw, spec, name),
            TypeKind::Boolean => match raw {
                Value::List(_) | Value::Structured(_) => Outcome::Reject,
                scalar => Outcome::Accept(Value::Bool(catalog::boolean(scalar))),
            },
            TypeKind::Username => textual_rule(raw, |s| catalog::username(s, name)),
            TypeKind::Permalink => textual_rule(raw, |s| catalog::permalink(s, name)),
            TypeKind::Token => textual_rule(raw, |s| catalog::token(s, name)),
            TypeKind::Color => textual_rule(raw, |s| catalog::color(s, name)),
            TypeKind::Email => self.email(raw, name),
            TypeKind::Url => textual_rule(raw, |s| catalog::url(s, name)),
            TypeKind::Date | TypeKind::DateTime => {
                textual_rule(raw, |s| catalog::sql_date(s, name))
            }
            TypeKind::Regexp => {
                let re = field.pattern().ok_or_else(|| ConfigurationError::MissingRegex {
                    field: name.to_string(),
                })?;
                textual_rule(raw, |s| catalog::regexp(s, re, name))
            }
            TypeKind::Password => Outcome::Accept(raw.clone()),
            TypeKind::Enum => {
                let allowed = spec
                    .enum_values
                    .as_deref()
                    .filter(|values| !values.is_empty())
                    .ok_or_else(|| ConfigurationError::MissingEnumValues {
                        field: name.to_string(),
                    })?;
                Outcome::from_result(catalog::enumeration(raw, allowed, name), |v| v)
            }
            TypeKind::Json => json(raw),
            TypeKind::JsonArray => json_array(raw),
            TypeKind::Array => array(raw, spec),
            TypeKind::ArrayCsv => self.array_csv(name, field, raw, depth)?,
            TypeKind::Custom(type_name) => self.custom(type_name, raw, spec)?,
            TypeKind::Text | TypeKind::Textarea => match self.registry.get(spec.kind.name()) {
                Some(custom) => match custom.coerce(raw, spec) {
                    Some(value) => Outcome::Accept(value),
                    None => Outcome::Reject,
                },
                None => text(raw, spec),
            },
        };

        Ok(outcome)
    }

    fn email(&self, raw: &Value, name: &str) -> Outcome {
        let Some(address) = textual(raw) else {
            return Outcome::Reject;
        };
        if address.is_empty() && self.config.email_policy == EmailPolicy::AllowEmpty {
            return Outcome::Accept(Value::Text(address));
        }
        Outcome::from_result(catalog::email(&address, name), Value::Text)
    }

    fn custom(
        &self,
        type_name: &str,
        raw: &Value,
        spec: &FieldSpec,
    ) -> Result<Outcome, ConfigurationError> {
        let custom = self.registry.resolve(type_name).inspect_err(|e| {
            tracing::warn!(custom_type = type_name, error = %e, "schema references unregistered type");
        })?;
        Ok(match custom.coerce(raw, spec) {
            Some(value) => Outcome::Accept(value),
            None => Outcome::Reject,
        })
    }

    /// Split on commas and validate each element through the walk with a
    /// single-field schema. Any element failure rejects the whole field.
    fn array_csv(
        &self,
        name: &str,
        field: &CompiledField,
        raw: &Value,
        depth: usize,
    ) -> Result<Outcome, ConfigurationError> {
        let Value::Text(text) = raw else {
            return Ok(Outcome::Reject);
        };
        let element = field.element().ok_or_else(|| ConfigurationError::NestedCsv {
            field: name.to_string(),
        })?;
        if depth >= MAX_NESTING_DEPTH {
            tracing::warn!(field = name, depth, "array_csv nesting limit reached");
            return Ok(Outcome::Reject);
        }

        let mut items = Vec::new();
        for piece in text.split(',') {
            let mut scratch = Record::new();
            scratch.insert(name.to_string(), Value::text(piece));

            let (mut coerced, report) = self.walk(
                &scratch,
                std::iter::once((name, EntryRef::Typed(element))),
                depth + 1,
            )?;
            if !report.is_clean() {
                return Ok(Outcome::Reject);
            }
            items.push(coerced.remove(name).unwrap_or_default());
        }

        Ok(Outcome::Accept(Value::List(items)))
    }
}

/// Validate `input` in place with the process-wide registry and the
/// default configuration.
pub fn validate(input: &mut Record, schema: &Schema) -> Result<(), CoerceError> {
    Coercer::global(EngineConfig::default()).validate(input, schema)
}

/// Text view of a scalar. Numbers render in their canonical form.
fn textual(raw: &Value) -> Option<String> {
    match raw {
        Value::Text(_) | Value::Int(_) | Value::Float(_) => raw.scalar_text(),
        _ => None,
    }
}

fn textual_rule<F>(raw: &Value, rule: F) -> Outcome
where
    F: FnOnce(&str) -> Result<String, CoerceError>,
{
    match textual(raw) {
        Some(text) => Outcome::from_result(rule(&text), Value::Text),
        None => Outcome::Reject,
    }
}

fn marker(raw: &Value) -> Outcome {
    match textual(raw) {
        Some(text) => Outcome::Accept(Value::Text(sanitize_string(&text, None))),
        None => Outcome::Reject,
    }
}

/// Integer kinds. Fractional bounds are tightened to the enclosed integers.
fn integer(raw: &Value, min: Option<f64>, max: Option<f64>, name: &str) -> Outcome {
    let lo = min.map(|m| m.ceil() as i64);
    let hi = max.map(|m| m.floor() as i64);
    let result = match raw {
        Value::Int(n) => catalog::check_int_range(*n, lo, hi, name),
        Value::Text(s) => catalog::int(s, lo, hi, name),
        _ => return Outcome::Reject,
    };
    Outcome::from_result(result, Value::Int)
}

fn floating(raw: &Value, spec: &FieldSpec, name: &str) -> Outcome {
    let result = match raw {
        Value::Float(f) if f.is_finite() => catalog::check_float_range(*f, spec.min, spec.max, name),
        Value::Int(n) => catalog::check_float_range(*n as f64, spec.min, spec.max, name),
        Value::Text(s) => catalog::float(s, spec.min, spec.max, name),
        _ => return Outcome::Reject,
    };
    Outcome::from_result(result, Value::Float)
}

fn text(raw: &Value, spec: &FieldSpec) -> Outcome {
    let Some(text) = textual(raw) else {
        return Outcome::Reject;
    };
    let length = text.chars().count() as f64;
    if spec.min.is_some_and(|min| length < min) || spec.max.is_some_and(|max| length > max) {
        return Outcome::Reject;
    }
    if spec.raw {
        Outcome::Accept(Value::Text(text))
    } else {
        Outcome::Accept(Value::Text(sanitize_string(&text, None)))
    }
}

/// Parse one JSON document. A literal `null` is a failure.
fn parse_json(raw: &Value) -> Option<serde_json::Value> {
    let tree = match raw {
        Value::Text(s) => serde_json::from_str::<serde_json::Value>(s).ok()?,
        Value::Structured(tree) => tree.clone(),
        Value::Int(_) | Value::Float(_) | Value::Bool(_) => raw.to_json(),
        Value::Null | Value::List(_) => return None,
    };
    (!tree.is_null()).then_some(tree)
}

fn json(raw: &Value) -> Outcome {
    match parse_json(raw) {
        Some(tree) => Outcome::Accept(Value::Structured(tree)),
        None => Outcome::Reject,
    }
}

/// Falsy input becomes an empty list; a single value is treated as a
/// one-element sequence. One unparsable element rejects the field.
fn json_array(raw: &Value) -> Outcome {
    if raw.is_falsy() {
        return Outcome::Accept(Value::List(Vec::new()));
    }
    let elements = match raw {
        Value::List(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };
    let parsed: Option<Vec<Value>> = elements
        .iter()
        .map(|element| parse_json(element).map(Value::Structured))
        .collect();
    match parsed {
        Some(items) => Outcome::Accept(Value::List(items)),
        None => Outcome::Reject,
    }
}

/// A scalar becomes a one-element list; bounds apply to the element count.
fn array(raw: &Value, spec: &FieldSpec) -> Outcome {
    let items = match raw {
        Value::List(items) => items.clone(),
        single => vec![single.clone()],
    };
    let count = items.len() as f64;
    if spec.min.is_some_and(|min| count < min) || spec.max.is_some_and(|max| count > max) {
        return Outcome::Reject;
    }
    Outcome::Accept(Value::List(items))
}
