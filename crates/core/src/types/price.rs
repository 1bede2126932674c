//! Integer price representation in minor currency units.
//!
//! Menu prices arrive as `data-price` attributes (e.g. `"1500"`) and are
//! kept as whole minor units so totals never drift. Display formatting
//! groups thousands with commas, e.g. `1,500 UGX`.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] or [`CurrencyCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is negative.
    #[error("price cannot be negative: {0}")]
    Negative(String),
    /// The input is not a whole number.
    #[error("price must be a whole number of minor units: {0}")]
    NotAnInteger(String),
    /// The currency code is not supported.
    #[error("unsupported currency code: {0}")]
    UnknownCurrency(String),
}

/// A non-negative amount in minor currency units.
///
/// For zero-decimal currencies such as `UGX` the minor unit is the
/// shilling itself, so `Price::new(1500)` is 1,500 UGX.
///
/// ## Examples
///
/// ```
/// use chapati_core::{CurrencyCode, Price};
///
/// let price = Price::parse("1500").unwrap();
/// assert_eq!(price.times(2), Price::new(3000));
/// assert_eq!(price.display(CurrencyCode::UGX), "1,500 UGX");
///
/// assert!(Price::parse("-5").is_err());
/// assert!(Price::parse("12.50").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Create a price from minor units.
    #[must_use]
    pub const fn new(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// Parse a price from a string of minor units.
    ///
    /// Surrounding whitespace is ignored. Anything other than a plain
    /// non-negative integer is rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, negative, or not an integer.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        if trimmed.starts_with('-') {
            return Err(PriceError::Negative(trimmed.to_owned()));
        }

        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| PriceError::NotAnInteger(trimmed.to_owned()))
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> u64 {
        self.0
    }

    /// Multiply by a quantity, saturating at `u64::MAX`.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Format for display with thousands separators and the currency code.
    #[must_use]
    pub fn display(&self, currency: CurrencyCode) -> String {
        let digits = currency.minor_digits();
        if digits == 0 {
            return format!("{} {}", group_thousands(self.0), currency.code());
        }

        let scale = 10_u64.pow(digits);
        let whole = self.0 / scale;
        let fraction = self.0 % scale;
        format!(
            "{}.{fraction:0width$} {}",
            group_thousands(whole),
            currency.code(),
            width = digits as usize
        )
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for Price {
    fn from(minor_units: u64) -> Self {
        Self(minor_units)
    }
}

/// ISO 4217 currency codes used across East Africa, plus USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    UGX,
    KES,
    TZS,
    RWF,
    USD,
}

impl CurrencyCode {
    /// The three-letter code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UGX => "UGX",
            Self::KES => "KES",
            Self::TZS => "TZS",
            Self::RWF => "RWF",
            Self::USD => "USD",
        }
    }

    /// Number of decimal digits in the minor unit.
    #[must_use]
    pub const fn minor_digits(&self) -> u32 {
        match self {
            Self::UGX | Self::RWF => 0,
            Self::KES | Self::TZS | Self::USD => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UGX" => Ok(Self::UGX),
            "KES" => Ok(Self::KES),
            "TZS" => Ok(Self::TZS),
            "RWF" => Ok(Self::RWF),
            "USD" => Ok(Self::USD),
            _ => Err(PriceError::UnknownCurrency(s.to_owned())),
        }
    }
}

/// Group an integer's digits in threes, e.g. `1234567` -> `1,234,567`.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
