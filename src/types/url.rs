//! URL and DSN types.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

use super::impl_validated_str;

/// Longest URL accepted; the conventional browser limit.
const MAX_URL_LENGTH: usize = 2083;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<scheme>[a-z][a-z0-9+.-]*))?://(?:[^/@]*@)?(?P<host>[^/:]+)(?::(?P<port>[0-9]+))?(?:/[^?#]*)?(?:\?[^#]*)?(?:#.*)?$",
    )
    .expect("invalid URL pattern")
});

/// A validated URL for service endpoints.
///
/// The scheme is optional (`//host:1234` is accepted) but the `//` authority
/// marker is not. Scheme-specific wrappers such as [`HttpUrl`] or
/// [`PostgresDsn`] additionally require a scheme from their own allowed set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnyUrl {
    url: String,
}

impl AnyUrl {
    const ALLOWED_SCHEMES: &'static [&'static str] = &[
        "http",
        "https",
        "ftp",
        "postgres",
        "postgresql",
        "redis",
        "amqp",
        "mongodb",
        "kafka",
    ];

    /// Validates a raw URL string.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        let scheme = Self::check(value)?;
        if let Some(scheme) = scheme
            && !Self::ALLOWED_SCHEMES.contains(&scheme)
        {
            return Err(ValidationError::new(format!(
                "URL scheme `{scheme}` is not allowed; expected one of: {}",
                Self::ALLOWED_SCHEMES.join(", ")
            )));
        }
        Ok(Self {
            url: value.to_owned(),
        })
    }

    /// Structural checks shared with the DSN wrappers. Returns the scheme,
    /// if present.
    fn check(value: &str) -> Result<Option<&str>, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::new("URL cannot be empty"));
        }
        if value.len() > MAX_URL_LENGTH {
            return Err(ValidationError::new(format!(
                "URL is longer than {MAX_URL_LENGTH} characters"
            )));
        }
        let captures = URL_PATTERN
            .captures(value)
            .ok_or_else(|| ValidationError::new(format!("invalid URL format: {value:?}")))?;
        if let Some(port) = captures.name("port") {
            let port: u32 = port
                .as_str()
                .parse()
                .map_err(|_| ValidationError::new("invalid URL port"))?;
            if !(1..=65_535).contains(&port) {
                return Err(ValidationError::new(format!(
                    "URL port {port} is out of range 1..=65535"
                )));
            }
        }
        Ok(captures.name("scheme").map(|scheme| scheme.as_str()))
    }

    /// The validated URL string.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The URL scheme, if one was given.
    pub fn scheme(&self) -> Option<&str> {
        self.url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .filter(|scheme| !scheme.is_empty())
    }

    /// The URL host.
    pub fn host(&self) -> &str {
        URL_PATTERN
            .captures(&self.url)
            .and_then(|captures| captures.name("host"))
            .map_or("", |host| host.as_str())
    }

    /// The URL port, if one was given.
    pub fn port(&self) -> Option<u16> {
        let captures = URL_PATTERN.captures(&self.url)?;
        captures.name("port")?.as_str().parse().ok()
    }
}

impl_validated_str!(AnyUrl);

/// Defines a URL wrapper restricted to a fixed scheme set. Unlike [`AnyUrl`],
/// the scheme is mandatory.
macro_rules! dsn_url {
    ($(#[$attr:meta])* $name:ident, schemes: [$($scheme:literal),+ $(,)?]) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(AnyUrl);

        impl $name {
            const ALLOWED_SCHEMES: &'static [&'static str] = &[$($scheme),+];

            /// Validates a raw URL string, requiring one of the allowed schemes.
            pub fn validate(value: &str) -> Result<Self, ValidationError> {
                let scheme = AnyUrl::check(value)?;
                match scheme {
                    Some(scheme) if Self::ALLOWED_SCHEMES.contains(&scheme) => Ok(Self(AnyUrl {
                        url: value.to_owned(),
                    })),
                    _ => Err(ValidationError::new(format!(
                        "URL must use one of the schemes: {}",
                        Self::ALLOWED_SCHEMES.join(", ")
                    ))),
                }
            }

            /// The validated URL string.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            /// The URL scheme.
            pub fn scheme(&self) -> Option<&str> {
                self.0.scheme()
            }

            /// The URL host.
            pub fn host(&self) -> &str {
                self.0.host()
            }

            /// The URL port, if one was given.
            pub fn port(&self) -> Option<u16> {
                self.0.port()
            }
        }

        impl_validated_str!($name);
    };
}

dsn_url!(
    /// An HTTP or HTTPS URL.
    HttpUrl,
    schemes: ["http", "https"]
);
dsn_url!(
    /// A PostgreSQL connection URL.
    PostgresDsn,
    schemes: ["postgres", "postgresql"]
);
dsn_url!(
    /// A Redis connection URL.
    RedisDsn,
    schemes: ["redis"]
);
dsn_url!(
    /// An AMQP broker URL.
    AmqpDsn,
    schemes: ["amqp"]
);
dsn_url!(
    /// A MongoDB connection URL.
    MongoDsn,
    schemes: ["mongodb"]
);
dsn_url!(
    /// A Kafka bootstrap URL.
    KafkaDsn,
    schemes: ["kafka"]
);
