//! # Schemas
//!
//! A [`Schema`] is an ordered, immutable mapping of field name →
//! [`FieldEntry`]. It is built once at model-definition time, either with
//! [`SchemaBuilder`] or from a declarative YAML/JSON document, and shared
//! read-only by every validation call.
//!
//! ## Document Format
//!
//! ```yaml
//! name: article
//! fields:
//!   id: { type: uint, required: true }
//!   title: { type: text, max: 120 }
//!   note: ~                 # bare marker: sanitized text
//!   count: int              # shorthand: kind only
//!   status: { type: enum, values: [draft, published], default: draft }
//!   tags: { type: array_csv, subtype: uint }
//! ```
//!
//! Field order follows document order. JSON documents are accepted too,
//! since JSON is a subset of YAML.

use std::path::Path;

use coerce_core::{ConfigurationError, Value};
use serde::Deserialize;

use crate::field::{CompiledField, FieldEntry, FieldSpec};
use crate::kind::TypeKind;
use crate::registry::TypeRegistry;

/// Ordered, immutable mapping of field name → entry.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<(String, FieldEntry)>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Schema identifier used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.fields.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn get(&self, field: &str) -> Option<&FieldEntry> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, entry)| entry)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Verify that every custom kind referenced by this schema (including
    /// `array_csv` element kinds) is registered.
    ///
    /// Call at startup, after the registry is frozen, so a schema that names
    /// an unregistered type aborts the deployment instead of failing a request.
    pub fn check_custom_types(&self, registry: &TypeRegistry) -> Result<(), ConfigurationError> {
        for (_, entry) in &self.fields {
            let Some(field) = entry.typed() else { continue };
            let kinds = std::iter::once(field.kind()).chain(field.element().map(CompiledField::kind));
            for kind in kinds {
                if let TypeKind::Custom(name) = kind {
                    registry.resolve(name)?;
                }
            }
        }
        Ok(())
    }

    /// Parse a schema document from YAML or JSON text.
    pub fn from_yaml_str(source_name: &str, text: &str) -> Result<Self, ConfigurationError> {
        let malformed = |reason: String| ConfigurationError::MalformedSchema {
            source_name: source_name.to_string(),
            reason,
        };

        let document: SchemaDocument =
            serde_yaml::from_str(text).map_err(|e| malformed(format!("invalid YAML: {e}")))?;

        let mut builder = Schema::builder(document.name.unwrap_or_else(|| source_name.to_string()));

        for (key, value) in document.fields {
            let field = key
                .as_str()
                .ok_or_else(|| malformed(format!("field names must be strings, got {key:?}")))?
                .to_string();

            builder = match value {
                serde_yaml::Value::Null => builder.marker(field),
                serde_yaml::Value::String(kind) => {
                    builder.field(field, FieldSpec::new(kind.as_str()))
                }
                mapping @ serde_yaml::Value::Mapping(_) => {
                    let doc: FieldDocument = serde_yaml::from_value(mapping)
                        .map_err(|e| malformed(format!("field '{field}': {e}")))?;
                    builder.field(field, doc.into_spec())
                }
                other => {
                    return Err(malformed(format!(
                        "field '{field}': expected a mapping, a kind name or null, got {other:?}"
                    )))
                }
            };
        }

        builder.build()
    }

    /// Load a schema document from disk.
    pub fn from_path(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigurationError::MalformedSchema {
            source_name: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        Self::from_yaml_str(&path.display().to_string(), &text)
    }
}

enum PendingEntry {
    Marker,
    Typed(FieldSpec),
}

/// Collects field declarations; [`SchemaBuilder::build`] runs every
/// consistency check.
pub struct SchemaBuilder {
    name: String,
    fields: Vec<(String, PendingEntry)>,
}

impl SchemaBuilder {
    /// Declare a typed field.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.push((name.into(), PendingEntry::Typed(spec)));
        self
    }

    /// Declare a bare marker field (sanitized text, no constraints).
    pub fn marker(mut self, name: impl Into<String>) -> Self {
        self.fields.push((name.into(), PendingEntry::Marker));
        self
    }

    /// Validate and freeze the schema.
    pub fn build(self) -> Result<Schema, ConfigurationError> {
        let mut fields: Vec<(String, FieldEntry)> = Vec::with_capacity(self.fields.len());

        for (name, pending) in self.fields {
            if fields.iter().any(|(existing, _)| *existing == name) {
                return Err(ConfigurationError::DuplicateField { field: name });
            }
            let entry = match pending {
                PendingEntry::Marker => FieldEntry::Marker,
                PendingEntry::Typed(spec) => FieldEntry::Typed(spec.compile(&name)?),
            };
            fields.push((name, entry));
        }

        tracing::debug!(schema = %self.name, fields = fields.len(), "schema built");

        Ok(Schema {
            name: self.name,
            fields,
        })
    }
}

#[derive(Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    name: Option<String>,
    fields: serde_yaml::Mapping,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDocument {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default, alias = "regexp")]
    regex: Option<String>,
    #[serde(default)]
    values: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    raw: bool,
}

impl FieldDocument {
    fn into_spec(self) -> FieldSpec {
        FieldSpec {
            kind: TypeKind::from(self.kind.as_str()),
            required: self.required,
            default: self.default.map(Value::from),
            min: self.min,
            max: self.max,
            regex: self.regex,
            enum_values: self
                .values
                .map(|values| values.into_iter().map(Value::from).collect()),
            subtype: self.subtype.as_deref().map(TypeKind::from),
            raw: self.raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;

    const ARTICLE: &str = r#"
name: article
fields:
  id: { type: uint, required: true }
  title: { type: text, max: 120 }
  note: ~
  count: int
  status: { type: enum, values: [draft, published], default: draft }
  tags: { type: array_csv, subtype: uint }
"#;

    #[test]
    fn document_preserves_field_order() {
        let schema = Schema::from_yaml_str("article.yaml", ARTICLE).unwrap();
        assert_eq!(schema.name(), "article");
        assert_eq!(
            schema.field_names(),
            vec!["id", "title", "note", "count", "status", "tags"]
        );
        assert!(matches!(schema.get("note"), Some(FieldEntry::Marker)));

        let status = schema.get("status").unwrap().typed().unwrap();
        assert_eq!(status.spec().default, Some(Value::text("draft")));

        let tags = schema.get("tags").unwrap().typed().unwrap();
        assert_eq!(tags.element().unwrap().kind(), &TypeKind::UInt);
    }

    #[test]
    fn json_documents_are_accepted() {
        let schema = Schema::from_yaml_str(
            "inline.json",
            r#"{"fields": {"b": {"type": "int"}, "a": {"type": "text"}}}"#,
        )
        .unwrap();
        assert_eq!(schema.name(), "inline.json");
        assert_eq!(schema.field_names(), vec!["b", "a"]);
    }

    #[test]
    fn unknown_field_keys_are_malformed() {
        let err = Schema::from_yaml_str(
            "bad.yaml",
            "fields:\n  x: { type: int, maximum: 3 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedSchema { .. }));
        assert!(err.to_string().contains("'x'"));
    }

    #[test]
    fn enum_without_values_fails_at_load() {
        let err = Schema::from_yaml_str("bad.yaml", "fields:\n  s: enum\n").unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingEnumValues { .. }));
    }

    #[test]
    fn empty_shorthand_kind_fails_at_load() {
        let err = Schema::from_yaml_str("bad.yaml", "fields:\n  f: \"\"\n").unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyTypeName);
    }

    #[test]
    fn nan_bounds_fail_at_load() {
        let err = Schema::from_yaml_str("bad.yaml", "fields:\n  n: { type: int, min: .nan }\n")
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::NonFiniteBound { .. }));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = Schema::builder("dup")
            .field("a", FieldSpec::new(TypeKind::Int))
            .marker("a")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateField { field: "a".into() });
    }

    #[test]
    fn unregistered_custom_types_are_reported() {
        let schema = Schema::builder("people")
            .field("slug", FieldSpec::new("slug"))
            .field("aliases", FieldSpec::new(TypeKind::ArrayCsv).subtype("nickname"))
            .build()
            .unwrap();

        let err = schema.check_custom_types(&TypeRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownCustomType {
                name: "slug".into()
            }
        );

        let registry = TypeRegistry::builder()
            .register("slug", |raw: &Value, _: &FieldSpec| Some(raw.clone()))
            .unwrap()
            .register("nickname", |raw: &Value, _: &FieldSpec| Some(raw.clone()))
            .unwrap()
            .build();
        schema.check_custom_types(&registry).unwrap();
    }
}
