//! Settings metadata: the static field catalog, naming policy and type registry.
//!
//! Each settings type declares its fields through [`SettingsMetadata::builder()`],
//! typically inside a `LazyLock` static returned from [`Settings::metadata()`].
//! The catalog fixes everything resolution needs up front: the coercion kind of
//! every field is selected once here, never re-derived per value.
//!
//! [`Settings::metadata()`]: crate::Settings::metadata

use std::{
    any::TypeId,
    collections::HashMap,
    fmt,
    sync::{LazyLock, RwLock},
};

use serde_json::Value;

use crate::Settings;

/// Naming policy shared by all instances of a settings type.
///
/// Controls how external (environment) keys are derived from field names and
/// whether an env file is loaded before resolution.
#[derive(Debug, Clone, Copy)]
pub struct NamingPolicy {
    /// Path of a `key=value` file loaded into the process environment before
    /// resolution. A missing file is silently ignored.
    pub env_file: Option<&'static str>,
    /// Encoding of the env file. Only `"utf-8"` is supported.
    pub env_file_encoding: &'static str,
    /// Whether field names keep their declared casing in environment keys.
    /// When `false`, names are upper-cased.
    pub case_sensitive: bool,
    /// Prefix prepended to every environment key, after case transformation.
    /// The prefix itself is never transformed.
    pub env_prefix: &'static str,
    /// Delimiter reserved for composite key flattening.
    pub nested_delimiter: &'static str,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingPolicy {
    /// Creates the default policy: case-insensitive, no prefix, no env file.
    pub const fn new() -> Self {
        Self {
            env_file: None,
            env_file_encoding: "utf-8",
            case_sensitive: false,
            env_prefix: "",
            nested_delimiter: "__",
        }
    }

    /// Declares an env file to load before resolution.
    #[must_use]
    pub const fn with_env_file(mut self, path: &'static str) -> Self {
        self.env_file = Some(path);
        self
    }

    /// Sets the env file encoding.
    #[must_use]
    pub const fn with_env_file_encoding(mut self, encoding: &'static str) -> Self {
        self.env_file_encoding = encoding;
        self
    }

    /// Keeps the declared casing of field names in environment keys.
    #[must_use]
    pub const fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Sets the environment key prefix. Supply the prefix already in the
    /// desired case; it is not transformed.
    #[must_use]
    pub const fn with_prefix(mut self, prefix: &'static str) -> Self {
        self.env_prefix = prefix;
        self
    }

    /// Sets the delimiter reserved for composite key flattening.
    #[must_use]
    pub const fn with_nested_delimiter(mut self, delimiter: &'static str) -> Self {
        self.nested_delimiter = delimiter;
        self
    }
}

/// How a field obtains its fallback value.
///
/// The fixed-value and factory shapes are deliberately distinct: a fixed
/// default is read (and cloned) eagerly, while a factory is invoked fresh per
/// resolution so that mutable defaults such as an empty list are never shared
/// between instances.
#[derive(Debug, Clone)]
pub enum DefaultSource {
    /// No default; the field must be supplied explicitly or via the environment.
    Required,
    /// Fixed default value.
    Value(Value),
    /// Zero-argument producer invoked lazily, once, only when no explicit or
    /// environment value exists.
    Factory(fn() -> Value),
}

/// Coercion kind of a field, selected once at catalog build time.
#[derive(Clone, Copy)]
pub enum CoercionKind {
    /// Boolean target. Environment strings are truthy iff they
    /// case-insensitively match `true`, `1`, `t`, `y` or `yes`; everything
    /// else coerces to `false` without an error.
    Bool,
    /// Integer or optional-integer target; parsed as base-10.
    Integer,
    /// Floating-point or optional-floating-point target.
    Float,
    /// Sequence target. Bracketed environment strings are parsed as JSON
    /// literals; everything else is split on commas into strings.
    Sequence,
    /// Mapping target; environment strings are parsed as JSON literals.
    Mapping,
    /// Nested settings type with its own field catalog.
    Nested(fn() -> &'static SettingsMetadata),
    /// Plain strings and opaque validated types. The raw string is passed
    /// through unchanged; opaque types convert during final deserialization.
    Raw,
}

impl fmt::Debug for CoercionKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => formatter.write_str("Bool"),
            Self::Integer => formatter.write_str("Integer"),
            Self::Float => formatter.write_str("Float"),
            Self::Sequence => formatter.write_str("Sequence"),
            Self::Mapping => formatter.write_str("Mapping"),
            Self::Nested(meta) => write!(formatter, "Nested({})", meta().ty),
            Self::Raw => formatter.write_str("Raw"),
        }
    }
}

/// Metadata for a single declared field.
#[derive(Debug, Clone)]
pub struct FieldMetadata {
    /// Declared field identifier.
    pub name: &'static str,
    /// Optional override for the external lookup key; defaults to `name`.
    pub env_name: Option<&'static str>,
    /// Coercion kind of the declared type.
    pub kind: CoercionKind,
    /// Whether the declared type is an `Option<_>`. Affects null handling,
    /// serialization omission and schema nullability; it does not make the
    /// field optional to supply.
    pub is_optional: bool,
    /// Default shape of the field.
    pub default: DefaultSource,
}

impl FieldMetadata {
    /// Creates metadata for a required field.
    pub fn new(name: &'static str, kind: CoercionKind) -> Self {
        Self {
            name,
            env_name: None,
            kind,
            is_optional: false,
            default: DefaultSource::Required,
        }
    }

    /// Overrides the external lookup key.
    #[must_use]
    pub fn with_env_name(mut self, env_name: &'static str) -> Self {
        self.env_name = Some(env_name);
        self
    }

    /// Marks the declared type as an `Option<_>`.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Declares a fixed default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultSource::Value(value.into());
        self
    }

    /// Declares a default factory, invoked fresh per resolution.
    #[must_use]
    pub fn with_default_factory(mut self, factory: fn() -> Value) -> Self {
        self.default = DefaultSource::Factory(factory);
        self
    }

    /// The external name used for environment lookup before case and prefix
    /// transformations.
    pub fn external_name(&self) -> &'static str {
        self.env_name.unwrap_or(self.name)
    }

    /// A field is required iff it has neither a fixed default nor a factory.
    pub fn is_required(&self) -> bool {
        matches!(self.default, DefaultSource::Required)
    }
}

/// Ordered field catalog of a settings type.
#[derive(Debug, Clone)]
pub struct SettingsMetadata {
    /// Name of the settings type in code.
    pub ty: &'static str,
    /// Naming policy shared by all instances of the type.
    pub naming: NamingPolicy,
    /// Declared fields, in declaration order.
    pub fields: Vec<FieldMetadata>,
}

impl SettingsMetadata {
    /// Starts building a catalog for the named type.
    pub fn builder(ty: &'static str) -> SettingsMetadataBuilder {
        SettingsMetadataBuilder {
            ty,
            naming: NamingPolicy::new(),
            fields: Vec::new(),
        }
    }

    /// Looks up a field by its declared name.
    pub fn field(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Iterates over required field names in catalog order.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.is_required())
            .map(|field| field.name)
    }
}

/// Builder for [`SettingsMetadata`].
#[derive(Debug)]
pub struct SettingsMetadataBuilder {
    ty: &'static str,
    naming: NamingPolicy,
    fields: Vec<FieldMetadata>,
}

impl SettingsMetadataBuilder {
    /// Sets the naming policy for the type.
    #[must_use]
    pub fn naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    /// Appends a field to the catalog. Fields are resolved in insertion order.
    #[must_use]
    pub fn field(mut self, field: FieldMetadata) -> Self {
        self.fields.push(field);
        self
    }

    /// Finalizes the catalog.
    ///
    /// # Panics
    ///
    /// Panics on an empty or duplicate field name; both are definition errors
    /// that cannot be produced by a well-formed settings declaration.
    pub fn build(self) -> SettingsMetadata {
        for (idx, field) in self.fields.iter().enumerate() {
            assert!(
                !field.name.is_empty(),
                "empty field name in settings type `{}`",
                self.ty
            );
            assert!(
                !self.fields[..idx].iter().any(|prev| prev.name == field.name),
                "duplicate field `{}` in settings type `{}`",
                field.name,
                self.ty
            );
        }
        SettingsMetadata {
            ty: self.ty,
            naming: self.naming,
            fields: self.fields,
        }
    }
}

/// Process-wide registry of settings metadata keyed by type identity.
/// Entries are written once on first use and are read-only afterwards.
static REGISTRY: LazyLock<RwLock<HashMap<TypeId, &'static SettingsMetadata>>> =
    LazyLock::new(RwLock::default);

/// Returns the registered metadata for `T`, registering it on first access.
pub(crate) fn register<T: Settings>() -> &'static SettingsMetadata {
    let id = TypeId::of::<T>();
    {
        let registry = REGISTRY.read().expect("settings registry poisoned");
        if let Some(meta) = registry.get(&id) {
            return meta;
        }
    }
    let meta = T::metadata();
    let mut registry = REGISTRY.write().expect("settings registry poisoned");
    *registry.entry(id).or_insert(meta)
}
