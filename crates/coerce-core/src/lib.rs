//! # coerce-core — Foundational Types for the Coercion Engine
//!
//! This crate defines the types shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One value model.** Raw parameters and coerced results are both
//!    [`Value`]s, so a coerced [`Record`] can be validated again.
//!
//! 2. **Two error tiers.** [`ConfigurationError`] for schema/registry
//!    authoring mistakes (fatal), [`CoerceError::IncorrectParameters`] and
//!    [`CoerceError::MissingParameters`] for bad request input (recoverable,
//!    field-level).
//!
//! 3. **Explicit configuration.** Behavior that depends on the deployment
//!    (timezone offset, empty-email policy) lives in [`EngineConfig`],
//!    never in hidden globals.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `coerce-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use config::{EmailPolicy, EngineConfig};
pub use error::{CoerceError, ConfigError, ConfigurationError, ErrorBody};
pub use value::{record_from_json, record_to_json, Record, Value};
