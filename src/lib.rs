//! `env-settings` – typed settings resolved from explicit arguments, environment
//! variables and declared defaults.
//!
//! # Overview
//!
//! A settings type declares a static field catalog ([`SettingsMetadata`]): for
//! every field, its coercion kind, optional external-name override and default
//! shape. Resolution assembles values from prioritized sources (explicit
//! [`Loader`] arguments, environment variables named per the type's
//! [`NamingPolicy`], and declared defaults), coerces raw strings to the
//! declared types, enforces required fields and finally deserializes the
//! assembled object into the settings struct via `serde`. The same catalog
//! also yields a machine-readable JSON schema ([`Settings::schema()`]).
//!
//! Coercion kinds form a closed set selected once at catalog build time, so
//! per-value dispatch never re-derives type information. Defaults distinguish
//! fixed values from zero-argument factories; factories run fresh per
//! resolution, which keeps mutable defaults (an empty list, say) from being
//! shared between instances.
//!
//! Resolution is fail-fast and synchronous: fields are validated in catalog
//! order and the first failure aborts with a single descriptive
//! [`SettingsError`]. There is no partially constructed state.
//!
//! The [`types`] module provides validated scalar types (URLs and DSNs, email
//! addresses, IP networks, MAC addresses, payment cards, secrets, file paths
//! and more) that slot into settings fields as opaque string-backed targets.
//!
//! [`SettingsMetadata`]: metadata::SettingsMetadata
//! [`NamingPolicy`]: metadata::NamingPolicy
//!
//! # Examples
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use env_settings::{
//!     metadata::{CoercionKind, FieldMetadata, NamingPolicy, SettingsMetadata},
//!     Environment, Settings,
//! };
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct AppSettings {
//!     debug: bool,
//!     port: i64,
//!     log_level: String,
//! }
//!
//! impl Settings for AppSettings {
//!     fn metadata() -> &'static SettingsMetadata {
//!         static METADATA: LazyLock<SettingsMetadata> = LazyLock::new(|| {
//!             SettingsMetadata::builder("AppSettings")
//!                 .naming(NamingPolicy::new().with_prefix("APP_"))
//!                 .field(FieldMetadata::new("debug", CoercionKind::Bool))
//!                 .field(FieldMetadata::new("port", CoercionKind::Integer))
//!                 .field(FieldMetadata::new("log_level", CoercionKind::Raw).with_default("info"))
//!                 .build()
//!         });
//!         &METADATA
//!     }
//! }
//!
//! // A custom snapshot; `Loader::load` scans the process env by default.
//! let env = Environment::from_iter([("APP_DEBUG", "1"), ("APP_PORT", "8080")]);
//! let settings = AppSettings::loader()
//!     .with("port", 9_000) // explicit arguments win over the environment
//!     .environment(env)
//!     .load()?;
//! assert!(settings.debug);
//! assert_eq!(settings.port, 9_000);
//! assert_eq!(settings.log_level, "info"); // from the default
//!
//! let schema = AppSettings::schema()?;
//! assert_eq!(schema["required"], serde_json::json!(["debug", "port"]));
//! # Ok::<_, env_settings::SettingsError>(())
//! ```

// Linter settings
#![warn(missing_docs)]

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

pub use self::{
    env::Environment,
    error::{SettingsError, ValidationError},
    resolve::Loader,
};

mod coerce;
mod env;
mod error;
pub mod metadata;
mod resolve;
mod schema;
pub mod types;

/// A settings type with a static field catalog.
///
/// Implementations provide [`Self::metadata()`], typically building the
/// catalog once inside a `LazyLock` static; everything else is derived from
/// it. The catalog is registered in a process-wide registry keyed by type
/// identity on first use and is read-only thereafter.
pub trait Settings: DeserializeOwned + Serialize + 'static {
    /// Returns the static field catalog for this type.
    fn metadata() -> &'static metadata::SettingsMetadata;

    /// Starts a loader with no explicit arguments.
    fn loader() -> Loader<Self> {
        Loader::new()
    }

    /// Resolves the settings from the process environment and declared
    /// defaults, loading the policy's env file first if one is declared.
    fn from_env() -> Result<Self, SettingsError> {
        Loader::new().load()
    }

    /// Returns the JSON schema descriptor for this type: a nested object keyed
    /// by `type`, `properties` and `required`. Generated from the catalog
    /// alone, independent of any resolved values, and cached after the first
    /// call.
    fn schema() -> Result<&'static Value, SettingsError> {
        schema::schema_of::<Self>()
    }

    /// Serializes every set field to a flat JSON map. Optional fields that
    /// were absent from all sources are omitted, not emitted as null.
    fn dump(&self) -> Result<Map<String, Value>, SettingsError> {
        resolve::dump(self)
    }

    /// JSON string form of [`Self::dump()`].
    fn dump_json(&self) -> Result<String, SettingsError> {
        let map = self.dump()?;
        serde_json::to_string(&map).map_err(|source| SettingsError::Validation {
            ty: Self::metadata().ty,
            field: None,
            source,
        })
    }
}
