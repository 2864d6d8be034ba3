//! Payment card numbers with brand detection.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Card brands recognized by [`PaymentCardNumber`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentCardBrand {
    /// Visa.
    Visa,
    /// Mastercard.
    Mastercard,
    /// American Express.
    Amex,
    /// Discover.
    Discover,
    /// Diners Club.
    Diners,
    /// JCB.
    Jcb,
    /// UnionPay.
    Unionpay,
    /// Maestro.
    Maestro,
}

impl PaymentCardBrand {
    /// Lowercase brand name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visa => "visa",
            Self::Mastercard => "mastercard",
            Self::Amex => "amex",
            Self::Discover => "discover",
            Self::Diners => "diners",
            Self::Jcb => "jcb",
            Self::Unionpay => "unionpay",
            Self::Maestro => "maestro",
        }
    }
}

impl fmt::Display for PaymentCardBrand {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Brand prefixes, checked in declaration order; the first match wins.
static BRAND_PATTERNS: LazyLock<Vec<(PaymentCardBrand, Regex)>> = LazyLock::new(|| {
    [
        (PaymentCardBrand::Visa, r"^4[0-9]{12}(?:[0-9]{3})?$"),
        (PaymentCardBrand::Mastercard, r"^5[1-5][0-9]{14}$"),
        (PaymentCardBrand::Amex, r"^3[47][0-9]{13}$"),
        (PaymentCardBrand::Discover, r"^6(?:011|5[0-9]{2})[0-9]{12}$"),
        (PaymentCardBrand::Diners, r"^3(?:0[0-5]|[68][0-9])[0-9]{11}$"),
        (PaymentCardBrand::Jcb, r"^(?:2131|1800|35\d{3})\d{11}$"),
        (PaymentCardBrand::Unionpay, r"^62[0-9]{14,17}$"),
        (
            PaymentCardBrand::Maestro,
            r"^(?:5[0678]\d\d|6304|6390|67\d\d)\d{8,15}$",
        ),
    ]
    .into_iter()
    .map(|(brand, pattern)| (brand, Regex::new(pattern).expect("invalid card pattern")))
    .collect()
});

/// A Luhn-valid payment card number of a recognized brand.
///
/// Spaces and hyphens in the input are stripped. The full number is kept in
/// memory for [`Self::bin()`] and [`Self::last4()`], but `Debug`, `Display`
/// and `Serialize` all emit the masked form only.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PaymentCardNumber {
    number: String,
    brand: PaymentCardBrand,
}

impl PaymentCardNumber {
    /// Validates a raw card number.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        let clean: String = value
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != '-')
            .collect();
        if clean.is_empty() || !clean.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ValidationError::new(
                "card number must contain only digits, spaces and hyphens",
            ));
        }
        if !(13..=19).contains(&clean.len()) {
            return Err(ValidationError::new(format!(
                "card number length {} is out of range 13..=19",
                clean.len()
            )));
        }
        if !luhn_check(&clean) {
            return Err(ValidationError::new("card number failed the Luhn check"));
        }
        let brand = BRAND_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(&clean))
            .map(|(brand, _)| *brand)
            .ok_or_else(|| ValidationError::new("card number matches no known brand"))?;
        Ok(Self {
            number: clean,
            brand,
        })
    }

    /// The detected brand.
    pub fn brand(&self) -> PaymentCardBrand {
        self.brand
    }

    /// The bank identification number, i.e. the first 6 digits.
    pub fn bin(&self) -> &str {
        &self.number[..6]
    }

    /// The last 4 digits.
    pub fn last4(&self) -> &str {
        &self.number[self.number.len() - 4..]
    }

    /// The number with the middle digits replaced by `*`.
    pub fn masked(&self) -> String {
        format!(
            "{}{}{}",
            self.bin(),
            "*".repeat(self.number.len() - 10),
            self.last4()
        )
    }
}

/// Standard Luhn checksum over an ASCII digit string.
fn luhn_check(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, byte)| {
            let digit = u32::from(byte - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

impl fmt::Debug for PaymentCardNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PaymentCardNumber")
            .field("number", &self.masked())
            .field("brand", &self.brand)
            .finish()
    }
}

impl fmt::Display for PaymentCardNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.masked())
    }
}

impl FromStr for PaymentCardNumber {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::validate(raw)
    }
}

/// Serializes the masked form; the full number never leaves the process via
/// serialization.
impl Serialize for PaymentCardNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.masked())
    }
}

impl<'de> Deserialize<'de> for PaymentCardNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::validate(&raw).map_err(de::Error::custom)
    }
}
