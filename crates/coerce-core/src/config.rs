//! Engine configuration.
//!
//! Per-deployment knobs that change how individual kinds coerce. Defaults
//! suit most callers; override via environment variables or explicit
//! construction.

use crate::error::ConfigError;

/// Environment variable holding the caller's UTC offset in minutes.
pub const ENV_TZ_OFFSET: &str = "COERCE_TZ_OFFSET_MINUTES";
/// Environment variable selecting the email policy (`allow_empty` | `strict`).
pub const ENV_EMAIL_POLICY: &str = "COERCE_EMAIL_POLICY";

/// How the `email` kind treats an empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailPolicy {
    /// An empty string passes validation unchanged.
    #[default]
    AllowEmpty,
    /// An empty string is rejected like any malformed address.
    Strict,
}

/// Configuration consulted by the coercion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    /// UTC offset of the caller, in minutes. Added (× 60) to every
    /// `unix_timestamp` value.
    pub timezone_offset_minutes: i32,
    /// Empty-value handling for the `email` kind.
    pub email_policy: EmailPolicy,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `COERCE_TZ_OFFSET_MINUTES` (default: `0`)
    /// - `COERCE_EMAIL_POLICY` (default: `allow_empty`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timezone_offset_minutes = match lookup(ENV_TZ_OFFSET) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: ENV_TZ_OFFSET.to_string(),
                value: raw.clone(),
            })?,
            None => 0,
        };

        let email_policy = match lookup(ENV_EMAIL_POLICY) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "allow_empty" => EmailPolicy::AllowEmpty,
                "strict" => EmailPolicy::Strict,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: ENV_EMAIL_POLICY.to_string(),
                        value: raw,
                    })
                }
            },
            None => EmailPolicy::default(),
        };

        Ok(Self {
            timezone_offset_minutes,
            email_policy,
        })
    }

    /// Offset in seconds applied to `unix_timestamp` values.
    pub fn timezone_offset_seconds(&self) -> i64 {
        i64::from(self.timezone_offset_minutes) * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn parses_offset_and_policy() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_TZ_OFFSET, "-120"),
            (ENV_EMAIL_POLICY, "Strict"),
        ]))
        .unwrap();
        assert_eq!(config.timezone_offset_minutes, -120);
        assert_eq!(config.timezone_offset_seconds(), -7200);
        assert_eq!(config.email_policy, EmailPolicy::Strict);
    }

    #[test]
    fn rejects_garbage() {
        let err = EngineConfig::from_lookup(lookup(&[(ENV_TZ_OFFSET, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_TZ_OFFSET));

        let err =
            EngineConfig::from_lookup(lookup(&[(ENV_EMAIL_POLICY, "lenient")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
