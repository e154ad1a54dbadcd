//! # Error Aggregation
//!
//! The engine collects field failures into a [`Report`] instead of failing
//! fast. Only [`Report::decide`] turns the report into an error, applying
//! the priority rule: incorrect fields win over missing fields.

use coerce_core::{CoerceError, Record};

/// Field names that failed during one validation pass, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    incorrect: Vec<String>,
    missing: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_incorrect(&mut self, field: &str) {
        if !self.incorrect.iter().any(|f| f == field) {
            self.incorrect.push(field.to_string());
        }
    }

    pub fn mark_missing(&mut self, field: &str) {
        if !self.missing.iter().any(|f| f == field) {
            self.missing.push(field.to_string());
        }
    }

    pub fn incorrect(&self) -> &[String] {
        &self.incorrect
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn is_clean(&self) -> bool {
        self.incorrect.is_empty() && self.missing.is_empty()
    }

    /// Final decision: `IncorrectParameters` if any field was incorrect,
    /// else `MissingParameters` if any was missing, else the record.
    pub fn decide(self, record: Record) -> Result<Record, CoerceError> {
        if !self.incorrect.is_empty() {
            Err(CoerceError::IncorrectParameters {
                fields: self.incorrect,
            })
        } else if !self.missing.is_empty() {
            Err(CoerceError::MissingParameters {
                fields: self.missing,
            })
        } else {
            Ok(record)
        }
    }
}
