//! Validated scalar types usable as settings field targets.
//!
//! Each type is a newtype over its raw string form with a stateless
//! `validate(&str)` constructor. `Deserialize` impls route through `validate`,
//! so the settings engine converts these types during final deserialization of
//! a [`CoercionKind::Raw`](crate::metadata::CoercionKind::Raw) field without
//! duplicating any parsing logic.

pub mod extra;
pub mod file;
pub mod net;
pub mod payments;
pub mod secret;
pub mod url;

pub use self::{
    extra::{DateStr, PhoneNumber, UuidStr},
    file::FilePath,
    net::{EmailStr, IpInterface, IpNetwork, MacAddress},
    payments::{PaymentCardBrand, PaymentCardNumber},
    secret::SecretStr,
    url::{AmqpDsn, AnyUrl, HttpUrl, KafkaDsn, MongoDsn, PostgresDsn, RedisDsn},
};

/// Implements `Display`, `FromStr` and serde conversions for a string-backed
/// validated type exposing `validate(&str)` and `as_str()`.
macro_rules! impl_validated_str {
    ($ty:ident) => {
        impl ::std::fmt::Display for $ty {
            fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                formatter.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::ValidationError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::validate(raw)
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::validate(&raw).map_err(::serde::de::Error::custom)
            }
        }
    };
}
pub(crate) use impl_validated_str;
