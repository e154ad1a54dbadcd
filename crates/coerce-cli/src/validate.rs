//! # Validate Subcommand
//!
//! Validates a JSON parameter file against a schema document and prints
//! either the coerced record or the structured error body.
//!
//! Exit codes: 0 on success, 2 when the parameters are incorrect or
//! missing, 1 on configuration or I/O errors (reported through `main`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use coerce_core::{record_from_json, record_to_json, EmailPolicy, EngineConfig};
use coerce_schema::{Coercer, Schema, TypeRegistry};

/// Arguments for the `coerce validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Parameter file: a single JSON object.
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// UTC offset in minutes applied to unix_timestamp fields. Overrides
    /// COERCE_TZ_OFFSET_MINUTES.
    #[arg(long, allow_hyphen_values = true)]
    pub tz_offset_minutes: Option<i32>,

    /// Reject empty email values.
    #[arg(long)]
    pub strict_email: bool,
}

impl ValidateArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config =
            EngineConfig::from_env().context("invalid engine configuration in environment")?;
        if let Some(minutes) = self.tz_offset_minutes {
            config.timezone_offset_minutes = minutes;
        }
        if self.strict_email {
            config.email_policy = EmailPolicy::Strict;
        }
        Ok(config)
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let schema = load_schema(&args.schema)?;
    let input = read_json(&args.input)?;
    let config = args.engine_config()?;

    tracing::info!(
        schema = schema.name(),
        fields = schema.len(),
        tz_offset_minutes = config.timezone_offset_minutes,
        "validating parameters"
    );

    let (code, body) = validate_document(&schema, input, config)?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(code)
}

pub(crate) fn load_schema(path: &Path) -> Result<Schema> {
    Schema::from_path(path).with_context(|| format!("failed to load schema {}", path.display()))
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Validate one JSON object and return the exit code with the document to
/// print: the coerced record on success, the error body on a parameter
/// error. Configuration errors propagate.
pub fn validate_document(
    schema: &Schema,
    input: serde_json::Value,
    config: EngineConfig,
) -> Result<(u8, serde_json::Value)> {
    let record = record_from_json(input).context("input must be a JSON object")?;

    // No plugin mechanism on the command line: only built-in kinds resolve.
    let registry = TypeRegistry::default();
    schema
        .check_custom_types(&registry)
        .with_context(|| format!("schema '{}' cannot be used from the command line", schema.name()))?;

    match Coercer::new(&registry, config).coerce(&record, schema) {
        Ok(coerced) => Ok((0, record_to_json(&coerced))),
        Err(e) if e.is_recoverable() => {
            tracing::debug!(error = %e, "parameters rejected");
            Ok((2, serde_json::to_value(e.body())?))
        }
        Err(e) => Err(e).context("validation aborted"),
    }
}
