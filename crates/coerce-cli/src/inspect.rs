//! # Inspect and Kinds Subcommands
//!
//! `coerce inspect` prints one line per schema field with its kind and
//! constraints; `coerce kinds` lists the built-in type catalog.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use coerce_schema::{FieldEntry, Schema, BUILTIN_KINDS};

/// Arguments for the `coerce inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Schema document (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Emit JSON instead of a text table.
    #[arg(long)]
    pub json: bool,
}

/// Summary of one schema field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub raw: bool,
}

impl FieldSummary {
    fn describe(&self) -> String {
        let mut line = format!("{:<20} {}", self.name, self.kind);
        if let Some(subtype) = &self.subtype {
            line.push_str(&format!("<{subtype}>"));
        }
        if self.required {
            line.push_str(" required");
        }
        if let Some(default) = &self.default {
            line.push_str(&format!(" default={default}"));
        }
        if let Some(min) = self.min {
            line.push_str(&format!(" min={min}"));
        }
        if let Some(max) = self.max {
            line.push_str(&format!(" max={max}"));
        }
        if self.raw {
            line.push_str(" raw");
        }
        line
    }
}

pub fn summarize(schema: &Schema) -> Vec<FieldSummary> {
    schema
        .iter()
        .map(|(name, entry)| match entry {
            FieldEntry::Marker => FieldSummary {
                name: name.to_string(),
                kind: "marker".to_string(),
                subtype: None,
                required: false,
                default: None,
                min: None,
                max: None,
                raw: false,
            },
            FieldEntry::Typed(field) => {
                let spec = field.spec();
                FieldSummary {
                    name: name.to_string(),
                    kind: spec.kind.to_string(),
                    subtype: field.element().map(|e| e.kind().to_string()),
                    required: spec.required,
                    default: spec.default.as_ref().map(|v| v.to_json()),
                    min: spec.min,
                    max: spec.max,
                    raw: spec.raw,
                }
            }
        })
        .collect()
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let schema = crate::validate::load_schema(&args.schema)?;
    let fields = summarize(&schema);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else {
        println!("Schema: {} ({} fields)", schema.name(), fields.len());
        for field in &fields {
            println!("  {}", field.describe());
        }
    }
    Ok(0)
}

/// Execute the kinds subcommand.
pub fn run_kinds() -> Result<u8> {
    for kind in &BUILTIN_KINDS {
        println!("{kind}");
    }
    Ok(0)
}
