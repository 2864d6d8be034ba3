//! Secret strings with redacted output.

use std::{fmt, str::FromStr};

use secrecy::{ExposeSecret, SecretString};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Placeholder emitted instead of the secret value.
const REDACTED: &str = "**********";

const MIN_SECRET_LENGTH: usize = 1;
const MAX_SECRET_LENGTH: usize = 4096;

/// A secret string.
///
/// The value is zeroized on drop and never reaches `Debug`, `Display` or
/// serialized output; all three emit `**********`. Reading the value requires
/// the explicit [`Self::expose()`] call.
#[derive(Clone)]
pub struct SecretStr {
    inner: SecretString,
}

impl SecretStr {
    /// Validates a raw secret.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        if value.len() < MIN_SECRET_LENGTH {
            return Err(ValidationError::new("secret cannot be empty"));
        }
        if value.len() > MAX_SECRET_LENGTH {
            return Err(ValidationError::new(format!(
                "secret is longer than {MAX_SECRET_LENGTH} characters"
            )));
        }
        Ok(Self {
            inner: value.to_owned().into(),
        })
    }

    /// The underlying secret value.
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl fmt::Debug for SecretStr {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("SecretStr").field(&REDACTED).finish()
    }
}

impl fmt::Display for SecretStr {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(REDACTED)
    }
}

impl PartialEq for SecretStr {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl FromStr for SecretStr {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::validate(raw)
    }
}

/// Serializes the redacted placeholder, never the value. Dumping a settings
/// struct therefore cannot leak secrets.
impl Serialize for SecretStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for SecretStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::validate(&raw).map_err(de::Error::custom)
    }
}
