//! # Type Catalog — Standalone Scalar Validators
//!
//! Single-value validators mirroring the per-field rules of the engine.
//! Each returns the coerced scalar, or an `IncorrectParameters` error naming
//! the supplied field. The engine calls these internally; collaborators can
//! call them directly (e.g. a router validating one path parameter).
//!
//! ## Fixed Patterns
//!
//! | kind      | pattern                          |
//! |-----------|----------------------------------|
//! | username  | `^[A-Za-z0-9_.]{3,64}$`          |
//! | token     | `^[A-Za-z0-9_]{3,48}$`           |
//! | permalink | `^[A-Za-z0-9_]{3,32}$`           |
//! | color     | `#` + 6 or 8 hex digits          |
//! | sql date  | `YYYY-MM-DD HH:MM:SS`, real date |

use std::sync::LazyLock;

use chrono::NaiveDate;
use coerce_core::{CoerceError, Value};
use regex::Regex;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]{3,64}$").expect("static pattern compiles"));
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,48}$").expect("static pattern compiles"));
static PERMALINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}$").expect("static pattern compiles"));
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").expect("static pattern compiles")
});
static SQL_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2}) ([01][0-9]|2[0-3]):([0-5][0-9]):([0-5][0-9])$")
        .expect("static pattern compiles")
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]{1,64})@([A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+)$",
    )
    .expect("static pattern compiles")
});

/// Schemes accepted without a host component.
const HOSTLESS_SCHEMES: [&str; 3] = ["mailto", "news", "file"];

fn reject<T>(field: &str) -> Result<T, CoerceError> {
    Err(CoerceError::incorrect(field))
}

/// Strict integer syntax: optional sign, digits, no leading zeros,
/// surrounding whitespace ignored.
pub fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    trimmed.parse().ok()
}

/// Finite float syntax. A decimal comma is read as a decimal point.
pub fn parse_float(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty()
        || !normalized
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Range check on an integer.
pub fn check_int_range(
    n: i64,
    min: Option<i64>,
    max: Option<i64>,
    field: &str,
) -> Result<i64, CoerceError> {
    if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
        return reject(field);
    }
    Ok(n)
}

/// Range check on a float.
pub fn check_float_range(
    f: f64,
    min: Option<f64>,
    max: Option<f64>,
    field: &str,
) -> Result<f64, CoerceError> {
    if min.is_some_and(|min| f < min) || max.is_some_and(|max| f > max) {
        return reject(field);
    }
    Ok(f)
}

/// Signed integer with optional bounds.
pub fn int(raw: &str, min: Option<i64>, max: Option<i64>, field: &str) -> Result<i64, CoerceError> {
    match parse_int(raw) {
        Some(n) => check_int_range(n, min, max, field),
        None => reject(field),
    }
}

/// Unsigned integer. `min` defaults to 0 but may be overridden.
pub fn uint(raw: &str, min: Option<i64>, max: Option<i64>, field: &str) -> Result<i64, CoerceError> {
    int(raw, Some(min.unwrap_or(0)), max, field)
}

/// Floating point number with optional bounds.
pub fn float(raw: &str, min: Option<f64>, max: Option<f64>, field: &str) -> Result<f64, CoerceError> {
    match parse_float(raw) {
        Some(f) => check_float_range(f, min, max, field),
        None => reject(field),
    }
}

/// Double precision number. Same rules as [`float`].
pub fn double(raw: &str, min: Option<f64>, max: Option<f64>, field: &str) -> Result<f64, CoerceError> {
    float(raw, min, max, field)
}

pub fn is_email(raw: &str) -> bool {
    if raw.len() > 254 {
        return false;
    }
    match EMAIL_RE.captures(raw) {
        Some(caps) => {
            let local = caps.get(1).map_or("", |m| m.as_str());
            !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
        }
        None => false,
    }
}

/// Email address.
pub fn email(raw: &str, field: &str) -> Result<String, CoerceError> {
    if is_email(raw) {
        Ok(raw.to_string())
    } else {
        reject(field)
    }
}

pub fn is_url(raw: &str) -> bool {
    if raw.trim() != raw {
        return false;
    }
    match url::Url::parse(raw) {
        Ok(parsed) => parsed.has_host() || HOSTLESS_SCHEMES.contains(&parsed.scheme()),
        Err(_) => false,
    }
}

/// Absolute URL.
pub fn url(raw: &str, field: &str) -> Result<String, CoerceError> {
    if is_url(raw) {
        Ok(raw.to_string())
    } else {
        reject(field)
    }
}

fn pattern(re: &Regex, raw: &str, field: &str) -> Result<String, CoerceError> {
    if re.is_match(raw) {
        Ok(raw.to_string())
    } else {
        reject(field)
    }
}

pub fn username(raw: &str, field: &str) -> Result<String, CoerceError> {
    pattern(&USERNAME_RE, raw, field)
}

pub fn token(raw: &str, field: &str) -> Result<String, CoerceError> {
    pattern(&TOKEN_RE, raw, field)
}

pub fn permalink(raw: &str, field: &str) -> Result<String, CoerceError> {
    pattern(&PERMALINK_RE, raw, field)
}

pub fn color(raw: &str, field: &str) -> Result<String, CoerceError> {
    pattern(&COLOR_RE, raw, field)
}

/// Text matched against a caller-supplied pattern. The pattern is not
/// implicitly anchored.
pub fn regexp(raw: &str, re: &Regex, field: &str) -> Result<String, CoerceError> {
    pattern(re, raw, field)
}

pub fn is_sql_date(raw: &str) -> bool {
    let Some(caps) = SQL_DATE_RE.captures(raw) else {
        return false;
    };
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    match (part(1), part(2), part(3)) {
        (Some(year), Some(month), Some(day)) => {
            i32::try_from(year).is_ok_and(|y| NaiveDate::from_ymd_opt(y, month, day).is_some())
        }
        _ => false,
    }
}

/// SQL date-time string (`YYYY-MM-DD HH:MM:SS`) naming a real calendar date.
pub fn sql_date(raw: &str, field: &str) -> Result<String, CoerceError> {
    if is_sql_date(raw) {
        Ok(raw.to_string())
    } else {
        reject(field)
    }
}

/// Find `raw` among `allowed`.
///
/// Values match when equal, or when scalars compare loosely. The allowed value is
/// returned, so the coerced result always has the schema's own type.
pub fn match_enum<'a>(raw: &Value, allowed: &'a [Value]) -> Option<&'a Value> {
    allowed
        .iter()
        .find(|candidate| *candidate == raw || loosely_equal(raw, candidate))
}

/// Scalar comparison across variants. Numbers compare by value (`2` and
/// `2.0`); text compares with the rendering of a number or boolean, in
/// either direction (`"2"` and `2`).
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            a.as_float() == b.as_float()
        }
        (Value::Text(text), other @ (Value::Int(_) | Value::Float(_) | Value::Bool(_)))
        | (other @ (Value::Int(_) | Value::Float(_) | Value::Bool(_)), Value::Text(text)) => {
            other.scalar_text().as_deref() == Some(text.as_str())
        }
        _ => false,
    }
}

/// Value restricted to an explicit set.
pub fn enumeration(raw: &Value, allowed: &[Value], field: &str) -> Result<Value, CoerceError> {
    match match_enum(raw, allowed) {
        Some(value) => Ok(value.clone()),
        None => reject(field),
    }
}

/// Lenient boolean reading.
///
/// False for null, `false`, `0`, `0.0`, empty text, `"0"`, any casing of
/// `"false"`, and the empty list; true otherwise.
pub fn boolean(raw: &Value) -> bool {
    match raw {
        Value::Text(text) if text.eq_ignore_ascii_case("false") => false,
        other => !other.is_falsy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_incorrect<T: std::fmt::Debug>(result: Result<T, CoerceError>, field: &str) -> bool {
        matches!(result, Err(CoerceError::IncorrectParameters { fields }) if fields == vec![field.to_string()])
    }

    #[test]
    fn int_syntax() {
        assert_eq!(int("42", None, None, "n").unwrap(), 42);
        assert_eq!(int(" -7 ", None, None, "n").unwrap(), -7);
        assert_eq!(int("+3", None, None, "n").unwrap(), 3);
        assert!(is_incorrect(int("012", None, None, "n"), "n"));
        assert!(is_incorrect(int("1.5", None, None, "n"), "n"));
        assert!(is_incorrect(int("", None, None, "n"), "n"));
        assert!(is_incorrect(int("99999999999999999999", None, None, "n"), "n"));
    }

    #[test]
    fn int_bounds() {
        assert!(is_incorrect(int("11", Some(1), Some(10), "n"), "n"));
        assert_eq!(int("10", Some(1), Some(10), "n").unwrap(), 10);
    }

    #[test]
    fn uint_floor_is_zero_unless_overridden() {
        assert!(is_incorrect(uint("-1", None, None, "u"), "u"));
        assert_eq!(uint("-1", Some(-5), None, "u").unwrap(), -1);
        assert_eq!(uint("0", None, None, "u").unwrap(), 0);
    }

    #[test]
    fn float_accepts_decimal_comma() {
        assert_eq!(float("3,5", None, None, "f").unwrap(), 3.5);
        assert_eq!(double("0", None, None, "d").unwrap(), 0.0);
        assert_eq!(float("1e3", None, None, "f").unwrap(), 1000.0);
        assert!(is_incorrect(float("inf", None, None, "f"), "f"));
        assert!(is_incorrect(float("NaN", None, None, "f"), "f"));
        assert!(is_incorrect(float("2.5", Some(3.0), None, "f"), "f"));
    }

    #[test]
    fn email_addresses() {
        assert!(email("jane.doe+tag@example.co.uk", "e").is_ok());
        assert!(is_incorrect(email("jane@localhost", "e"), "e"));
        assert!(is_incorrect(email(".jane@example.com", "e"), "e"));
        assert!(is_incorrect(email("ja..ne@example.com", "e"), "e"));
        assert!(is_incorrect(email("not an email", "e"), "e"));
    }

    #[test]
    fn urls() {
        assert!(url("https://example.com/a?b=c", "u").is_ok());
        assert!(url("mailto:someone@example.com", "u").is_ok());
        assert!(is_incorrect(url("example.com", "u"), "u"));
        assert!(is_incorrect(url(" https://example.com", "u"), "u"));
    }

    #[test]
    fn fixed_patterns() {
        assert!(username("jane.doe_1", "x").is_ok());
        assert!(is_incorrect(username("jd", "x"), "x"));
        assert!(token("abc_123", "x").is_ok());
        assert!(is_incorrect(token("has-dash", "x"), "x"));
        assert!(permalink("hello_world", "x").is_ok());
        assert!(is_incorrect(permalink(&"a".repeat(33), "x"), "x"));
        assert!(color("#a1B2c3", "x").is_ok());
        assert!(color("#a1B2c3FF", "x").is_ok());
        assert!(is_incorrect(color("a1B2c3FF", "x"), "x"));
        assert!(is_incorrect(color("#a1B2c", "x"), "x"));
    }

    #[test]
    fn sql_dates_must_be_real() {
        assert!(sql_date("2024-02-29 23:59:59", "d").is_ok());
        assert!(is_incorrect(sql_date("2023-02-29 10:00:00", "d"), "d"));
        assert!(is_incorrect(sql_date("2024-01-01 24:00:00", "d"), "d"));
        assert!(is_incorrect(sql_date("2024-01-01", "d"), "d"));
    }

    #[test]
    fn enum_matching() {
        let allowed = vec![Value::text("a"), Value::Int(2)];
        assert_eq!(enumeration(&Value::text("a"), &allowed, "e").unwrap(), Value::text("a"));
        assert_eq!(enumeration(&Value::text("2"), &allowed, "e").unwrap(), Value::Int(2));
        assert!(is_incorrect(enumeration(&Value::text("A"), &allowed, "e"), "e"));
    }

    #[test]
    fn enum_matches_numbers_against_text_values() {
        let allowed = vec![Value::text("1"), Value::text("2"), Value::text("true")];
        assert_eq!(enumeration(&Value::Int(2), &allowed, "s").unwrap(), Value::text("2"));
        assert_eq!(enumeration(&Value::Bool(true), &allowed, "s").unwrap(), Value::text("true"));
        assert!(is_incorrect(enumeration(&Value::Int(3), &allowed, "s"), "s"));

        let numeric = vec![Value::Float(1.5), Value::Int(2)];
        assert_eq!(enumeration(&Value::Float(2.0), &numeric, "s").unwrap(), Value::Int(2));
        assert!(is_incorrect(enumeration(&Value::Bool(true), &numeric, "s"), "s"));
    }

    #[test]
    fn regexp_is_not_anchored() {
        let re = Regex::new("[0-9]{3}").unwrap();
        assert!(regexp("ab123", &re, "r").is_ok());
        assert!(is_incorrect(regexp("ab12", &re, "r"), "r"));
    }

    #[test]
    fn boolean_reading() {
        assert!(boolean(&Value::text("yes")));
        assert!(boolean(&Value::Int(1)));
        assert!(!boolean(&Value::text("FALSE")));
        assert!(!boolean(&Value::text("0")));
        assert!(!boolean(&Value::text("")));
        assert!(!boolean(&Value::Null));
    }

    proptest! {
        #[test]
        fn int_accepts_every_canonical_i64(n in any::<i64>()) {
            prop_assert_eq!(parse_int(&n.to_string()), Some(n));
        }

        #[test]
        fn uint_never_returns_negative(s in "-?[0-9]{1,6}") {
            if let Ok(n) = uint(&s, None, None, "u") {
                prop_assert!(n >= 0);
            }
        }
    }
}
