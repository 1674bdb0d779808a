//! Amount type for handling tax-inclusive invoice totals.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may include a euro sign, thousands separators and a decimal comma.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The currency symbol that may surround an amount, e.g. `€249.99` or `249.99 €`.
const EURO: char = '€';

/// Represents an invoice total, tax included ("Montant TTC").
///
/// Amounts are written with at least two fractional digits. Equality is numeric, so `250` and
/// `250.00` are the same amount.
///
/// # Examples
///
/// ```
/// # use factures::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("€1,249.5").unwrap();
/// assert_eq!(amount.to_string(), "1249.50");
/// ```
///
/// An empty string is a zero amount, which the record store treats as a missing value.
/// ```
/// # use factures::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("  ").unwrap().is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is below zero. Negative zero is not negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    input: String,
    source: Option<rust_decimal::Error>,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmountError")
            .field("input", &self.input)
            .field("source", &self.source)
            .finish()
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(e) => write!(f, "'{}' is not a number: {e}", self.input),
            None => write!(
                f,
                "'{}' has ambiguous decimal or thousands separators",
                self.input
            ),
        }
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn Error + 'static))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // The sign may come before the currency symbol: "-€5.00"
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let without_euro = unsigned
            .trim_start_matches(EURO)
            .trim_end_matches(EURO)
            .trim();

        let digits = normalize_separators(without_euro).ok_or_else(|| AmountError {
            input: s.to_string(),
            source: None,
        })?;
        let value = Decimal::from_str(&digits).map_err(|e| AmountError {
            input: s.to_string(),
            source: Some(e),
        })?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

/// Rewrites `1 234,56`, `1.234,56` and `1,234.56` as `1234.56`.
///
/// When both `,` and `.` appear, the last one is the decimal separator. A lone `,` followed by one
/// or two digits is a decimal comma. Otherwise separators must split the integer part into groups
/// of three digits. Returns `None` for anything else.
fn normalize_separators(s: &str) -> Option<String> {
    let s: String = s
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect();

    let (decimal, thousands) = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => (Some(','), Some('.')),
        (Some(_), Some(_)) => (Some('.'), Some(',')),
        (Some(_), None) => match s.split_once(',') {
            Some((_, frac)) if !frac.contains(',') && (1..=2).contains(&frac.len()) => {
                (Some(','), None)
            }
            _ => (None, Some(',')),
        },
        (None, Some(_)) if s.matches('.').count() == 1 => (Some('.'), None),
        (None, Some(_)) => (None, Some('.')),
        (None, None) => (None, None),
    };

    let (int_part, frac_part) = match decimal {
        Some(sep) => {
            let (int_part, frac_part) = s.rsplit_once(sep)?;
            (int_part, Some(frac_part))
        }
        None => (s.as_str(), None),
    };
    if frac_part.is_some_and(|f| f.contains([',', '.'])) {
        return None;
    }

    let int_digits = match thousands {
        Some(sep) => {
            let groups: Vec<&str> = int_part.split(sep).collect();
            let (first, rest) = groups.split_first()?;
            if first.is_empty() || first.len() > 3 || rest.iter().any(|g| g.len() != 3) {
                return None;
            }
            groups.concat()
        }
        None => int_part.to_string(),
    };

    Some(match frac_part {
        Some(frac) => format!("{int_digits}.{frac}"),
        None => int_digits,
    })
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut value = self.0;
        if value.scale() < 2 {
            value.rescale(2);
        }
        Display::fmt(&value, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("249.99").unwrap();
        assert_eq!(amount.value(), dec("249.99"));
    }

    #[test]
    fn test_parse_with_euro_prefix_and_suffix() {
        assert_eq!(Amount::from_str("€50.00").unwrap().value(), dec("50"));
        assert_eq!(Amount::from_str("50.00 €").unwrap().value(), dec("50"));
    }

    #[test]
    fn test_parse_negative_with_euro() {
        let amount = Amount::from_str("-€50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_with_commas() {
        let amount = Amount::from_str("1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(Amount::from_str("249,99").unwrap().to_string(), "249.99");
        assert_eq!(Amount::from_str("1 234,5").unwrap().value(), dec("1234.5"));
        assert_eq!(Amount::from_str("249,99 €").unwrap().value(), dec("249.99"));
    }

    #[test]
    fn test_parse_mixed_separators() {
        assert_eq!(Amount::from_str("1.234,56").unwrap().value(), dec("1234.56"));
        assert_eq!(Amount::from_str("1,234.56").unwrap().value(), dec("1234.56"));
        assert_eq!(Amount::from_str("1.234.567").unwrap().value(), dec("1234567"));
    }

    #[test]
    fn test_parse_ambiguous_separators() {
        for input in ["12,3456", "1,23,4", "1.234,5.6", "1234,567,8"] {
            let err = Amount::from_str(input).unwrap_err();
            assert!(err.to_string().contains("ambiguous"), "{input}: {err}");
        }
    }

    #[test]
    fn test_parse_empty_string_is_zero() {
        assert!(Amount::from_str("").unwrap().is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
        assert!(Amount::from_str("12.5.3").is_err());
    }

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Amount::new(dec("250")).to_string(), "250.00");
        assert_eq!(Amount::new(dec("249.9")).to_string(), "249.90");
        assert_eq!(Amount::new(dec("249.99")).to_string(), "249.99");
    }

    #[test]
    fn test_display_keeps_extra_precision() {
        assert_eq!(Amount::new(dec("1.005")).to_string(), "1.005");
    }

    #[test]
    fn test_equality_is_numeric() {
        assert_eq!(
            Amount::from_str("250").unwrap(),
            Amount::from_str("250.00").unwrap()
        );
    }

    #[test]
    fn test_zero_is_not_negative() {
        let zero = Amount::from_str("-0.00").unwrap();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
    }

    #[test]
    fn test_serde_json() {
        let amount = Amount::from_str("249.99").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"249.99\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
