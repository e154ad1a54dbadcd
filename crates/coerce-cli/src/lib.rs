//! # coerce-cli — Command-Line Front End
//!
//! Provides the `coerce` binary for exercising schemas outside a web
//! service.
//!
//! ## Subcommands
//!
//! - `coerce validate` — validate a JSON parameter file against a schema.
//! - `coerce inspect` — print the fields of a schema document.
//! - `coerce kinds` — list the built-in type catalog.
//!
//! ```bash
//! coerce validate --schema article.yaml --input request.json
//! coerce validate --schema event.yaml --input event.json --tz-offset-minutes -120
//! coerce inspect --schema article.yaml --json
//! ```

pub mod inspect;
pub mod validate;
