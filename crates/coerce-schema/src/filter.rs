//! # Row Filters
//!
//! Helpers for records that come back from storage rather than from a
//! request: lenient typecasting against a schema (no validation, never
//! fails), an email normalizer and key whitelist/blacklist projections.
//!
//! Null values are left as null by every cast; a stored `NULL` column has
//! no meaningful numeric reading.

use coerce_core::{EngineConfig, Record, Value};

use crate::catalog;
use crate::kind::TypeKind;
use crate::schema::Schema;

pub use crate::catalog::boolean;

/// Leading-integer reading: optional whitespace and sign, then digits.
/// Anything unparsable reads as 0; overflow saturates.
fn leading_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let mut n: i64 = 0;
    for digit in rest.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(digit - b'0');
        n = if negative {
            n.saturating_mul(10).saturating_sub(d)
        } else {
            n.saturating_mul(10).saturating_add(d)
        };
    }
    n
}

fn to_int(value: &Value) -> i64 {
    match value {
        Value::Int(n) => *n,
        Value::Float(f) => *f as i64,
        Value::Bool(b) => i64::from(*b),
        Value::Text(text) => leading_int(text),
        Value::List(items) => i64::from(!items.is_empty()),
        Value::Null | Value::Structured(_) => 0,
    }
}

fn to_float(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Text(text) => {
            catalog::parse_float(text).unwrap_or_else(|| leading_int(text) as f64)
        }
        _ => 0.0,
    }
}

/// Lenient conversion of one stored value to `kind`. Kinds without a
/// numeric or boolean reading pass through unchanged.
pub fn typecast(value: &Value, kind: &TypeKind, config: &EngineConfig) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match kind {
        TypeKind::Int | TypeKind::UInt => Value::Int(to_int(value)),
        TypeKind::Float | TypeKind::Double => Value::Float(to_float(value)),
        TypeKind::Boolean => Value::Bool(boolean(value)),
        TypeKind::UnixTimestamp => {
            Value::Int(to_int(value).saturating_add(config.timezone_offset_seconds()))
        }
        _ => value.clone(),
    }
}

/// Typecast every typed schema field present in `record`.
pub fn cast_entry(record: &mut Record, schema: &Schema, config: &EngineConfig) {
    for (name, entry) in schema.iter() {
        let Some(field) = entry.typed() else {
            continue;
        };
        if let Some(slot) = record.get_mut(name) {
            *slot = typecast(slot, field.kind(), config);
        }
    }
}

/// [`cast_entry`] over a list of rows.
pub fn cast(records: &mut [Record], schema: &Schema, config: &EngineConfig) {
    for record in records.iter_mut() {
        cast_entry(record, schema, config);
    }
}

/// Trimmed email address, or `None` when it is not a valid address.
pub fn email(value: &str) -> Option<String> {
    let trimmed = value.trim();
    catalog::is_email(trimmed).then(|| trimmed.to_string())
}

/// Keep only whitelisted keys.
pub fn filter_in_entry<S: AsRef<str>>(record: &Record, keys: &[S]) -> Record {
    record
        .iter()
        .filter(|(key, _)| keys.iter().any(|k| k.as_ref() == key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn filter_in<S: AsRef<str>>(records: &[Record], keys: &[S]) -> Vec<Record> {
    records.iter().map(|r| filter_in_entry(r, keys)).collect()
}

/// Drop blacklisted keys.
pub fn filter_out_entry<S: AsRef<str>>(record: &Record, keys: &[S]) -> Record {
    record
        .iter()
        .filter(|(key, _)| !keys.iter().any(|k| k.as_ref() == key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn filter_out<S: AsRef<str>>(records: &[Record], keys: &[S]) -> Vec<Record> {
    records.iter().map(|r| filter_out_entry(r, keys)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;

    fn row(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn leading_integer_reading() {
        assert_eq!(leading_int("42abc"), 42);
        assert_eq!(leading_int("  -7"), -7);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int("99999999999999999999"), i64::MAX);
    }

    #[test]
    fn typecast_by_kind() {
        let config = EngineConfig::default();
        assert_eq!(typecast(&Value::text("12"), &TypeKind::UInt, &config), Value::Int(12));
        assert_eq!(typecast(&Value::text("x"), &TypeKind::Int, &config), Value::Int(0));
        assert_eq!(typecast(&Value::text("2,5"), &TypeKind::Float, &config), Value::Float(2.5));
        assert_eq!(typecast(&Value::text("0"), &TypeKind::Boolean, &config), Value::Bool(false));
        assert_eq!(typecast(&Value::text("FALSE"), &TypeKind::Boolean, &config), Value::Bool(false));
        assert_eq!(typecast(&Value::text("<b>"), &TypeKind::Text, &config), Value::text("<b>"));
        assert_eq!(typecast(&Value::Null, &TypeKind::Int, &config), Value::Null);
    }

    #[test]
    fn typecast_timestamp_applies_offset() {
        let config = EngineConfig {
            timezone_offset_minutes: -60,
            ..EngineConfig::default()
        };
        assert_eq!(
            typecast(&Value::text("7200"), &TypeKind::UnixTimestamp, &config),
            Value::Int(3600)
        );
    }

    #[test]
    fn cast_touches_only_schema_fields() {
        let schema = Schema::builder("row")
            .field("id", FieldSpec::new(TypeKind::UInt))
            .field("active", FieldSpec::new(TypeKind::Boolean))
            .marker("label")
            .build()
            .unwrap();
        let mut rows = vec![
            row(&[("id", Value::text("3")), ("active", Value::text("1")), ("other", Value::text("5"))]),
            row(&[("id", Value::text("4")), ("label", Value::text("7"))]),
        ];
        cast(&mut rows, &schema, &EngineConfig::default());

        assert_eq!(rows[0]["id"], Value::Int(3));
        assert_eq!(rows[0]["active"], Value::Bool(true));
        assert_eq!(rows[0]["other"], Value::text("5"));
        assert_eq!(rows[1]["label"], Value::text("7"));
        assert!(!rows[1].contains_key("active"));
    }

    #[test]
    fn email_is_trimmed_and_checked() {
        assert_eq!(email("  jane@example.com \n"), Some("jane@example.com".to_string()));
        assert_eq!(email("not an address"), None);
        assert_eq!(email("   "), None);
    }

    #[test]
    fn whitelist_and_blacklist() {
        let rows = vec![row(&[
            ("id", Value::Int(1)),
            ("password", Value::text("x")),
            ("name", Value::text("n")),
        ])];

        let kept = filter_in(&rows, &["id", "name"]);
        assert_eq!(kept[0].keys().collect::<Vec<_>>(), ["id", "name"]);

        let dropped = filter_out(&rows, &["password"]);
        assert!(!dropped[0].contains_key("password"));
        assert_eq!(dropped[0].len(), 2);
    }
}
