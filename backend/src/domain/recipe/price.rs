//! Fixed-point recipe price with two decimal places.
//!
//! Prices hold at most five significant digits, two of them after the point,
//! so the largest accepted value is `999.99`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Digits allowed after the decimal point.
pub const PRICE_DECIMAL_PLACES: usize = 2;
/// Total significant digits allowed.
pub const PRICE_MAX_DIGITS: usize = 5;

const MAX_WHOLE_DIGITS: usize = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;

/// Reasons a price literal is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// Not a plain decimal literal: letters, exponents or several points.
    #[error("price must be a decimal number")]
    Malformed,
    /// Below zero. `-0` and `-0.00` are accepted as zero.
    #[error("price must not be negative")]
    Negative,
    /// More than [`PRICE_DECIMAL_PLACES`] digits after the point.
    #[error("price must have no more than {max} decimal places")]
    TooManyDecimalPlaces { max: usize },
    /// Too many significant digits before the point.
    #[error("price must have no more than {max} digits before the decimal point")]
    TooManyWholeDigits { max: usize },
}

impl PriceError {
    /// Machine-readable code reported alongside the `price` field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Negative => "negative",
            Self::TooManyDecimalPlaces { .. } => "too_many_decimal_places",
            Self::TooManyWholeDigits { .. } => "too_many_digits",
        }
    }
}

/// Non-negative price stored in hundredths.
///
/// # Examples
/// ```
/// use recipe_backend::domain::Price;
///
/// let price: Price = "5.5".parse().unwrap();
/// assert_eq!(price.cents(), 550);
/// assert_eq!(price.to_string(), "5.50");
/// assert!("1.005".parse::<Price>().is_err());
/// assert!("1000".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(i32);

impl Price {
    /// Build a price from hundredths, validating the digit budget.
    pub fn from_cents(cents: i32) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        if cents > 99_999 {
            return Err(PriceError::TooManyWholeDigits {
                max: MAX_WHOLE_DIGITS,
            });
        }
        Ok(Self(cents))
    }

    /// Amount in hundredths.
    pub fn cents(self) -> i32 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let unsigned = match raw.strip_prefix('-') {
            Some(rest) => {
                if rest.chars().any(|c| c.is_ascii_digit() && c != '0') {
                    return Err(PriceError::Negative);
                }
                rest
            }
            None => raw,
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(PriceError::Malformed);
        }
        if fraction.len() > PRICE_DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces {
                max: PRICE_DECIMAL_PLACES,
            });
        }
        let significant = whole.trim_start_matches('0');
        if significant.len() > MAX_WHOLE_DIGITS {
            return Err(PriceError::TooManyWholeDigits {
                max: MAX_WHOLE_DIGITS,
            });
        }
        let whole_value: i32 = if significant.is_empty() {
            0
        } else {
            significant.parse().map_err(|_| PriceError::Malformed)?
        };
        let fraction_value: i32 = format!("{fraction:0<2}")
            .parse()
            .map_err(|_| PriceError::Malformed)?;
        Self::from_cents(whole_value * 100 + fraction_value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
