//! Settings resolution errors.

use std::{borrow::Cow, error, fmt};

/// Errors produced while resolving a settings type.
///
/// Resolution is fail-fast: the first failing field aborts the whole
/// construction, so a single error is reported per attempt and no partially
/// constructed instance is ever observable.
#[derive(Debug)]
#[non_exhaustive]
pub enum SettingsError {
    /// A required field had no value from any source.
    MissingField {
        /// Settings type being resolved.
        ty: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// An environment variable could not be parsed into the field's declared type.
    EnvParse {
        /// The environment variable that failed to parse.
        key: String,
        /// The field the variable was resolved for.
        field: &'static str,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// An explicit or defaulted value failed conversion against the declared type.
    Validation {
        /// Settings type being resolved.
        ty: &'static str,
        /// Failing field, if the failure could be attributed to one.
        field: Option<&'static str>,
        /// Underlying conversion error.
        source: serde_json::Error,
    },
    /// Malformed settings definition, e.g. a cyclic nested-type graph or an
    /// unsupported env-file encoding.
    Definition {
        /// Settings type whose definition is malformed.
        ty: &'static str,
        /// Human-readable description of the problem.
        message: String,
    },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { ty, field } => {
                write!(formatter, "missing required field `{field}` in `{ty}`")
            }
            Self::EnvParse { key, field, source } => {
                write!(
                    formatter,
                    "error parsing environment variable `{key}` for field `{field}`: {source}"
                )
            }
            Self::Validation {
                ty,
                field: Some(field),
                source,
            } => {
                write!(
                    formatter,
                    "validation error for field `{field}` in `{ty}`: {source}"
                )
            }
            Self::Validation {
                ty,
                field: None,
                source,
            } => {
                write!(formatter, "validation error in `{ty}`: {source}")
            }
            Self::Definition { ty, message } => {
                write!(formatter, "invalid settings definition for `{ty}`: {message}")
            }
        }
    }
}

impl error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::EnvParse { source, .. } | Self::Validation { source, .. } => Some(source),
            Self::MissingField { .. } | Self::Definition { .. } => None,
        }
    }
}

impl SettingsError {
    /// Returns the field name this error concerns, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField { field, .. } | Self::EnvParse { field, .. } => Some(field),
            Self::Validation { field, .. } => *field,
            Self::Definition { .. } => None,
        }
    }
}

/// Validation failure for one of the validated scalar types in [`crate::types`].
#[derive(Debug, Clone)]
pub struct ValidationError {
    message: Cow<'static, str>,
}

impl ValidationError {
    pub(crate) fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.message)
    }
}

impl error::Error for ValidationError {}
