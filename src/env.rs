//! Environment access: external-key derivation, the environment snapshot and
//! env-file loading.

use std::{collections::HashMap, env, fs, path::Path};

use serde_json::{Map, Value};

use crate::{
    coerce,
    error::SettingsError,
    metadata::{FieldMetadata, NamingPolicy, SettingsMetadata},
};

impl NamingPolicy {
    /// Derives the environment lookup key for a field.
    ///
    /// The external name (the field name unless overridden) is upper-cased
    /// unless the policy is case-sensitive; the prefix is prepended after the
    /// case transformation and is never transformed itself, so callers must
    /// supply prefixes already in the desired case.
    pub fn env_key(&self, field: &FieldMetadata) -> String {
        let name = field.external_name();
        let cased = if self.case_sensitive {
            name.to_owned()
        } else {
            name.to_uppercase()
        };
        if self.env_prefix.is_empty() {
            cased
        } else {
            format!("{}{cased}", self.env_prefix)
        }
    }
}

/// Snapshot of string key–value pairs used as the environment source.
///
/// [`Environment::capture()`] reads the process environment once; custom
/// snapshots built with [`Environment::from_iter()`] keep tests deterministic
/// without mutating process state.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Captures the current process environment.
    pub fn capture() -> Self {
        Self {
            vars: env::vars().collect(),
        }
    }

    /// Creates a custom environment snapshot.
    pub fn from_iter<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Looks up a variable by its exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Scans the environment for every catalogued field, coercing present values
/// immediately. A coercion failure aborts the scan with an error naming both
/// the environment key and the field. Absent variables are omitted silently.
pub(crate) fn read_env_values(
    meta: &SettingsMetadata,
    environment: &Environment,
) -> Result<Map<String, Value>, SettingsError> {
    let mut values = Map::new();
    for field in &meta.fields {
        let key = meta.naming.env_key(field);
        let Some(raw) = environment.get(&key) else {
            continue;
        };
        let value = coerce::from_env_str(raw, field).map_err(|source| SettingsError::EnvParse {
            key: key.clone(),
            field: field.name,
            source,
        })?;
        tracing::trace!(field = field.name, key, "field sourced from environment");
        values.insert(field.name.to_owned(), value);
    }
    Ok(values)
}

/// Loads `key=value` entries from the policy's env file into the process
/// environment. Entries never override variables that are already set, and a
/// missing or unreadable file is silently skipped.
pub(crate) fn load_env_file(
    ty: &'static str,
    naming: &NamingPolicy,
) -> Result<(), SettingsError> {
    let Some(path) = naming.env_file else {
        return Ok(());
    };
    if !naming.env_file_encoding.eq_ignore_ascii_case("utf-8") {
        return Err(SettingsError::Definition {
            ty,
            message: format!(
                "unsupported env file encoding `{}`; only utf-8 is supported",
                naming.env_file_encoding
            ),
        });
    }

    let path = Path::new(path);
    let Ok(contents) = fs::read_to_string(path) else {
        tracing::debug!(path = %path.display(), "env file absent or unreadable; skipping");
        return Ok(());
    };

    let mut loaded = 0;
    for line in contents.lines() {
        let Some((key, value)) = parse_env_line(line) else {
            continue;
        };
        if env::var_os(key).is_some() {
            continue;
        }
        // SAFETY: mutating the process environment is only sound while no
        // other thread reads it concurrently. Env files are loaded once,
        // before any settings resolution touches the environment table;
        // sequencing concurrent constructions is the caller's responsibility.
        unsafe {
            env::set_var(key, value);
        }
        loaded += 1;
    }
    tracing::debug!(path = %path.display(), loaded, "loaded env file");
    Ok(())
}

/// Parses a single env-file line into a key–value pair. Comments, blank lines
/// and lines without `=` yield `None`. An `export ` prefix and single or
/// double quotes around the value are stripped.
fn parse_env_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, unquote(value.trim())))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
