//! Value resolution: precedence merging and construction of settings instances.

use std::{fmt, marker::PhantomData};

use serde_json::{Map, Value};

use crate::{
    coerce,
    env::{self, Environment},
    error::SettingsError,
    metadata::{self, DefaultSource, FieldMetadata},
    Settings,
};

/// Builder for resolving a settings type.
///
/// Values are selected per field with strict precedence: explicit argument >
/// environment variable > fixed default > default factory. Fields are
/// validated in catalog order and the first failure aborts the whole
/// resolution, so diagnostics are reproducible across runs.
pub struct Loader<T> {
    overrides: Map<String, Value>,
    environment: Option<Environment>,
    _settings: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Loader<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Loader")
            .field("overrides", &self.overrides)
            .field("environment", &self.environment)
            .finish()
    }
}

impl<T: Settings> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Settings> Loader<T> {
    /// Creates a loader with no explicit arguments.
    pub fn new() -> Self {
        Self {
            overrides: Map::new(),
            environment: None,
            _settings: PhantomData,
        }
    }

    /// Supplies an explicit value for a field. Explicit values take precedence
    /// over every other source; names that match no declared field are ignored.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    /// Replaces the process environment with a custom snapshot. When set, the
    /// env file declared by the naming policy is not loaded.
    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Resolves the settings instance.
    ///
    /// Either resolution completes with every field consistent, or it aborts
    /// on the first error and no instance is produced.
    pub fn load(mut self) -> Result<T, SettingsError> {
        let meta = metadata::register::<T>();
        let environment = match self.environment.take() {
            Some(environment) => environment,
            None => {
                env::load_env_file(meta.ty, &meta.naming)?;
                Environment::capture()
            }
        };
        let mut env_values = env::read_env_values(meta, &environment)?;

        let mut resolved = Map::new();
        for field in &meta.fields {
            // Explicit and environment nulls fall through to the defaults,
            // same as an absent value.
            let value = self
                .overrides
                .remove(field.name)
                .filter(|value| !value.is_null())
                .or_else(|| non_null(env_values.remove(field.name)))
                .or_else(|| default_for(field));
            match value {
                Some(value) => {
                    coerce::check_value(&value, field).map_err(|source| {
                        SettingsError::Validation {
                            ty: meta.ty,
                            field: Some(field.name),
                            source,
                        }
                    })?;
                    resolved.insert(field.name.to_owned(), value);
                }
                None if field.is_required() => {
                    return Err(SettingsError::MissingField {
                        ty: meta.ty,
                        field: field.name,
                    });
                }
                None => {} // optional and absent from every source; left unset
            }
        }
        tracing::debug!(ty = meta.ty, fields = resolved.len(), "resolved settings");

        serde_json::from_value(Value::Object(resolved)).map_err(|source| {
            SettingsError::Validation {
                ty: meta.ty,
                field: None,
                source,
            }
        })
    }
}

fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !value.is_null())
}

/// Evaluates the field's default. Fixed defaults are cloned; factories are
/// invoked fresh so mutable defaults are never shared between instances.
fn default_for(field: &FieldMetadata) -> Option<Value> {
    match &field.default {
        DefaultSource::Required => None,
        DefaultSource::Value(value) => Some(value.clone()),
        DefaultSource::Factory(factory) => Some(factory()),
    }
}

/// Serializes every set field of a settings instance to a JSON map. Optional
/// fields that were absent from all sources are omitted, not emitted as null.
pub(crate) fn dump<T: Settings>(settings: &T) -> Result<Map<String, Value>, SettingsError> {
    let meta = metadata::register::<T>();
    let value = serde_json::to_value(settings).map_err(|source| SettingsError::Validation {
        ty: meta.ty,
        field: None,
        source,
    })?;
    let Value::Object(mut map) = value else {
        return Err(SettingsError::Definition {
            ty: meta.ty,
            message: "settings must serialize to an object".to_owned(),
        });
    };
    map.retain(|_, value| !value.is_null());
    Ok(map)
}
