//! Filesystem path values.

use std::{
    env, fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A filesystem path.
///
/// Relative paths are resolved against the current working directory at
/// validation time. The path is not required to exist; use
/// [`Self::validate_existing()`] for that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilePath {
    path: PathBuf,
}

impl FilePath {
    /// Validates a raw path, resolving it to an absolute one.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::new("path cannot be empty"));
        }
        let path = PathBuf::from(value);
        let path = if path.is_absolute() {
            path
        } else {
            let cwd = env::current_dir().map_err(|err| {
                ValidationError::new(format!("cannot resolve relative path: {err}"))
            })?;
            cwd.join(path)
        };
        Ok(Self { path })
    }

    /// Like [`Self::validate()`], but also requires the path to exist.
    pub fn validate_existing(value: &str) -> Result<Self, ValidationError> {
        let this = Self::validate(value)?;
        if !this.exists() {
            return Err(ValidationError::new(format!(
                "path does not exist: {}",
                this.path.display()
            )));
        }
        Ok(this)
    }

    /// The resolved absolute path.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Whether the path exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Whether the path is an existing regular file.
    pub fn is_file(&self) -> bool {
        self.path.is_file()
    }

    /// Whether the path is an existing directory.
    pub fn is_dir(&self) -> bool {
        self.path.is_dir()
    }

    /// The file extension, if any.
    pub fn suffix(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path.display(), formatter)
    }
}

impl FromStr for FilePath {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::validate(raw)
    }
}

impl Serialize for FilePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.path.display())
    }
}

impl<'de> Deserialize<'de> for FilePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::validate(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_resolved() {
        let path = FilePath::validate("some/file.toml").unwrap();
        assert!(path.as_path().is_absolute());
        assert!(path.as_path().ends_with("some/file.toml"));
        assert_eq!(path.suffix(), Some("toml"));

        let absolute = FilePath::validate("/etc/hosts").unwrap();
        assert_eq!(absolute.as_path(), Path::new("/etc/hosts"));

        FilePath::validate("").unwrap_err();
    }

    #[test]
    fn existing_path_check() {
        let dir = env::temp_dir();
        let path = FilePath::validate_existing(dir.to_str().unwrap()).unwrap();
        assert!(path.is_dir());
        assert!(!path.is_file());

        let missing = dir.join("definitely-not-here-41583");
        FilePath::validate_existing(missing.to_str().unwrap()).unwrap_err();
    }
}
