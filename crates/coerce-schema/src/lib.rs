//! # coerce-schema — Schema-Driven Parameter Coercion
//!
//! Validates loosely typed request parameters against a declarative schema
//! and rewrites them into strongly typed values.
//!
//! ## Coercion (`engine`)
//!
//! [`Coercer::validate`] walks every schema field, coerces what it can and
//! collects what it cannot into a [`Report`]. The outcome is decided once,
//! after the whole walk: incorrect fields win over missing ones, and the
//! caller's record is only rewritten on success.
//!
//! ## Building Blocks
//!
//! - [`kind`]: the closed catalog of built-in kinds plus `Custom`.
//! - [`field`] and [`schema`]: field specs, checked at construction, and
//!   ordered schemas (built in code or loaded from YAML/JSON documents).
//! - [`registry`]: caller-defined kinds, frozen before use.
//! - [`catalog`]: the per-kind rules as standalone scalar validators.
//! - [`sanitize`] and [`filter`]: text sanitization, storage typecasting and
//!   key projections.
//!
//! ## Crate Policy
//!
//! - Depends only on `coerce-core` internally.
//! - Raw parameter values are never logged; only field names and kinds.
//! - Schemas and frozen registries are immutable and shared freely across
//!   threads.

pub mod catalog;
pub mod engine;
pub mod field;
pub mod filter;
pub mod kind;
pub mod registry;
pub mod report;
pub mod sanitize;
pub mod schema;

pub use engine::{validate, Coercer, MAX_NESTING_DEPTH};
pub use field::{CompiledField, FieldEntry, FieldSpec};
pub use kind::{TypeKind, BUILTIN_KINDS};
pub use registry::{CustomType, TypeRegistry, TypeRegistryBuilder};
pub use report::Report;
pub use sanitize::{sanitize_string, strip_tags};
pub use schema::{Schema, SchemaBuilder};
