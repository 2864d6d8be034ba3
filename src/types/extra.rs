//! Dates, UUIDs and phone numbers.

use std::sync::LazyLock;

use regex::Regex;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};
use uuid::Uuid;

use crate::error::ValidationError;

use super::impl_validated_str;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid date pattern"));

/// A calendar date in `YYYY-MM-DD` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateStr {
    raw: String,
    date: Date,
}

impl DateStr {
    /// Validates a raw date string.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        if !DATE_SHAPE.is_match(value) {
            return Err(ValidationError::new(format!(
                "invalid date format {value:?}; expected YYYY-MM-DD"
            )));
        }
        let date = Date::parse(value, DATE_FORMAT)
            .map_err(|err| ValidationError::new(format!("invalid date {value:?}: {err}")))?;
        Ok(Self {
            raw: value.to_owned(),
            date,
        })
    }

    /// The date string as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed date.
    pub fn date(&self) -> Date {
        self.date
    }
}

impl_validated_str!(DateStr);

/// A UUID in its string form.
///
/// Keeps the string exactly as given; [`Self::uuid()`] provides the parsed
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UuidStr {
    raw: String,
    uuid: Uuid,
}

impl UuidStr {
    /// Validates a raw UUID string.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        let uuid = Uuid::parse_str(value)
            .map_err(|err| ValidationError::new(format!("invalid UUID {value:?}: {err}")))?;
        Ok(Self {
            raw: value.to_owned(),
            uuid,
        })
    }

    /// The UUID string as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl_validated_str!(UuidStr);

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("invalid phone pattern"));

/// An E.164-style phone number.
///
/// Spaces, hyphens and parentheses are stripped before validation; the stored
/// form is the cleaned digit string with an optional leading `+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber {
    number: String,
}

impl PhoneNumber {
    /// Validates a raw phone number.
    pub fn validate(value: &str) -> Result<Self, ValidationError> {
        let clean: String = value
            .chars()
            .filter(|ch| !ch.is_whitespace() && !matches!(ch, '-' | '(' | ')'))
            .collect();
        if !PHONE_PATTERN.is_match(&clean) {
            return Err(ValidationError::new(format!(
                "invalid phone number: {value:?}"
            )));
        }
        Ok(Self { number: clean })
    }

    /// The cleaned number.
    pub fn as_str(&self) -> &str {
        &self.number
    }
}

impl_validated_str!(PhoneNumber);

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    #[test]
    fn date_validation() {
        let date = DateStr::validate("2024-02-29").unwrap();
        assert_eq!(date.date().year(), 2024);
        assert_eq!(date.date().month(), Month::February);
        assert_eq!(date.date().day(), 29);

        DateStr::validate("2023-02-29").unwrap_err(); // not a leap year
        DateStr::validate("2024-13-01").unwrap_err();
        DateStr::validate("2024-1-1").unwrap_err();
        DateStr::validate("01/02/2024").unwrap_err();
        DateStr::validate("").unwrap_err();
    }

    #[test]
    fn uuid_validation() {
        let uuid = UuidStr::validate("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(uuid.as_str(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(uuid.uuid().get_version_num(), 4);

        // Uppercase digits are valid; the raw form is preserved.
        let upper = UuidStr::validate("67E55044-10B1-426F-9247-BB680E5FE0C8").unwrap();
        assert_eq!(upper.as_str(), "67E55044-10B1-426F-9247-BB680E5FE0C8");
        assert_eq!(upper.uuid(), uuid.uuid());

        UuidStr::validate("not-a-uuid").unwrap_err();
        UuidStr::validate("67e55044-10b1-426f-9247").unwrap_err();
    }

    #[test]
    fn phone_validation() {
        let phone = PhoneNumber::validate("+1 (415) 555-0132").unwrap();
        assert_eq!(phone.as_str(), "+14155550132");
        let bare = PhoneNumber::validate("4155550132").unwrap();
        assert_eq!(bare.as_str(), "4155550132");

        PhoneNumber::validate("+0123456").unwrap_err(); // leading zero
        PhoneNumber::validate("+1").unwrap_err(); // too short
        PhoneNumber::validate("+123456789012345678").unwrap_err(); // too long
        PhoneNumber::validate("call-me").unwrap_err();
    }
}
