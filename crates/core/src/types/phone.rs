//! Phone number type for outbound WhatsApp contacts.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// Too few or too many digits for an E.164 number.
    #[error("phone number must have between {min} and {max} digits (got {got})")]
    InvalidLength {
        /// Minimum allowed digits.
        min: usize,
        /// Maximum allowed digits.
        max: usize,
        /// Digits found in the input.
        got: usize,
    },
    /// A leading zero means a national number without a country code.
    #[error("phone number must start with a country code, not 0")]
    MissingCountryCode,
}

/// A phone number in E.164 form, stored as digits only.
///
/// `wa.me` links take the number without the leading `+`, so that is the
/// canonical stored form. Spaces, dashes, dots and parentheses are accepted
/// on input and stripped.
///
/// ## Constraints
///
/// - 8-15 digits (E.164 allows at most 15)
/// - An optional single leading `+`
/// - First digit is a country code, so it cannot be `0`
///
/// ## Examples
///
/// ```
/// use chapati_core::PhoneNumber;
///
/// let number = PhoneNumber::parse("+256 703 055 329").unwrap();
/// assert_eq!(number.as_str(), "256703055329");
/// assert_eq!(number.e164(), "+256703055329");
///
/// assert!(PhoneNumber::parse("").is_err());
/// assert!(PhoneNumber::parse("0703055329").is_err()); // no country code
/// assert!(PhoneNumber::parse("256-70x").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum number of digits accepted.
    pub const MIN_DIGITS: usize = 8;
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Contains characters other than digits, a leading `+`, or separators
    /// - Has fewer than 8 or more than 15 digits
    /// - Starts with `0`
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(PhoneNumberError::InvalidCharacter(other)),
            }
        }

        if digits.len() < Self::MIN_DIGITS || digits.len() > Self::MAX_DIGITS {
            return Err(PhoneNumberError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                got: digits.len(),
            });
        }

        if digits.starts_with('0') {
            return Err(PhoneNumberError::MissingCountryCode);
        }

        Ok(Self(digits))
    }

    /// Returns the digits as a string slice (no leading `+`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number with a leading `+`.
    #[must_use]
    pub fn e164(&self) -> String {
        format!("+{}", self.0)
    }

    /// Consumes the `PhoneNumber` and returns its digits.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
