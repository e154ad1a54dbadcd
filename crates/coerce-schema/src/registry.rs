//! # Custom Type Registry
//!
//! Extends the type catalog with caller-defined kinds. A registry is built
//! single-threaded with [`TypeRegistryBuilder`], then frozen into an
//! immutable [`TypeRegistry`]. A frozen registry has no mutating API, so
//! concurrent validations read it without locks.
//!
//! ## Process-Wide Registry
//!
//! [`TypeRegistry::install_global`] publishes a frozen registry once for the
//! whole process. Installation must happen during initialization, before
//! the first call to [`TypeRegistry::global`]; a second installation (or an
//! installation after a read) is a configuration error.
//!
//! ## Callback Contract
//!
//! A custom type receives the raw value and the field's [`FieldSpec`] and
//! returns `Some(coerced)` to accept or `None` to reject. A rejection is
//! reported as an incorrect parameter on the field.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use coerce_core::{ConfigurationError, Value};

use crate::field::FieldSpec;
use crate::kind::TypeKind;

static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

/// A caller-defined coercion rule.
pub trait CustomType: Send + Sync {
    /// Coerce `raw`, or return `None` to reject it.
    fn coerce(&self, raw: &Value, spec: &FieldSpec) -> Option<Value>;
}

impl<F> CustomType for F
where
    F: Fn(&Value, &FieldSpec) -> Option<Value> + Send + Sync,
{
    fn coerce(&self, raw: &Value, spec: &FieldSpec) -> Option<Value> {
        self(raw, spec)
    }
}

/// Immutable lookup table of custom types.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<dyn CustomType>>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Resolve a custom type by name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownCustomType` if nothing is
    /// registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<&dyn CustomType, ConfigurationError> {
        self.get(name)
            .ok_or_else(|| ConfigurationError::UnknownCustomType {
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<&dyn CustomType> {
        self.types.get(name).map(|t| t.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Publish this registry as the process-wide registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::RegistryAlreadyInstalled` if a registry
    /// was already installed or [`TypeRegistry::global`] was already read.
    pub fn install_global(self) -> Result<&'static TypeRegistry, ConfigurationError> {
        let count = self.len();
        GLOBAL_REGISTRY
            .set(self)
            .map_err(|_| ConfigurationError::RegistryAlreadyInstalled)?;
        tracing::info!(custom_types = count, "installed process-wide type registry");
        GLOBAL_REGISTRY
            .get()
            .ok_or(ConfigurationError::RegistryAlreadyInstalled)
    }

    /// The process-wide registry. Empty if none was installed; reading it
    /// closes the installation window.
    pub fn global() -> &'static TypeRegistry {
        GLOBAL_REGISTRY.get_or_init(TypeRegistry::default)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

/// Mutable registry under construction.
#[derive(Default)]
pub struct TypeRegistryBuilder {
    types: HashMap<String, Arc<dyn CustomType>>,
}

impl TypeRegistryBuilder {
    /// Register a closure as a custom type.
    ///
    /// # Errors
    ///
    /// - `EmptyTypeName` for an empty name.
    /// - `ReservedTypeName` for a built-in kind name other than `text` and
    ///   `textarea` (those two may be overridden).
    pub fn register<F>(self, name: impl Into<String>, callback: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&Value, &FieldSpec) -> Option<Value> + Send + Sync + 'static,
    {
        self.register_type(name, Arc::new(callback))
    }

    /// Register a shared [`CustomType`] implementation.
    pub fn register_type(
        mut self,
        name: impl Into<String>,
        custom: Arc<dyn CustomType>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyTypeName);
        }
        if let Some(builtin) = TypeKind::builtin(&name) {
            if !builtin.is_overridable() {
                return Err(ConfigurationError::ReservedTypeName { name });
            }
        }
        tracing::info!(custom_type = %name, "registered custom type");
        self.types.insert(name, custom);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry { types: self.types }
    }
}
