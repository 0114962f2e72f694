//! Lenient parsing of operator-entered values.
//!
//! Payroll inputs arrive as free text: amounts with thousands separators,
//! hire dates in several formats, month names. None of these ever fail a
//! calculation. Instead every parser returns a [`Parsed`] value that is
//! either clean or defaulted with a [`DefaultReason`], so callers can tell a
//! genuine zero from a zero substituted for bad input.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::YearMonth;

/// Why a value was substituted with a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefaultReason {
    /// No value was supplied.
    Missing,
    /// A value was supplied but could not be understood.
    Malformed {
        /// The raw input as received.
        input: String,
    },
}

/// The outcome of parsing one input value.
///
/// # Example
///
/// ```
/// use payroll_engine::parsing::{Parsed, parse_amount};
/// use rust_decimal::Decimal;
///
/// let clean = parse_amount("1 250 000,50");
/// assert_eq!(clean.clone().into_value(), Decimal::new(125000050, 2));
/// assert!(!clean.is_defaulted());
///
/// let bad = parse_amount("n/a");
/// assert!(bad.is_defaulted());
/// assert_eq!(bad.into_value(), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    /// The input was understood.
    Clean(T),
    /// The input was missing or malformed and `value` was substituted.
    Defaulted {
        /// The substituted value.
        value: T,
        /// Why the substitution happened.
        reason: DefaultReason,
    },
}

impl<T> Parsed<T> {
    fn missing(value: T) -> Self {
        Parsed::Defaulted {
            value,
            reason: DefaultReason::Missing,
        }
    }

    fn malformed(value: T, input: &str) -> Self {
        Parsed::Defaulted {
            value,
            reason: DefaultReason::Malformed {
                input: input.to_string(),
            },
        }
    }

    /// Returns the parsed or substituted value.
    pub fn into_value(self) -> T {
        match self {
            Parsed::Clean(value) | Parsed::Defaulted { value, .. } => value,
        }
    }

    /// Returns a reference to the parsed or substituted value.
    pub fn value(&self) -> &T {
        match self {
            Parsed::Clean(value) | Parsed::Defaulted { value, .. } => value,
        }
    }

    /// Returns true if the value was substituted.
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Parsed::Defaulted { .. })
    }

    /// Returns the substitution reason, if any.
    pub fn reason(&self) -> Option<&DefaultReason> {
        match self {
            Parsed::Clean(_) => None,
            Parsed::Defaulted { reason, .. } => Some(reason),
        }
    }

    /// Splits into the value and, if it was defaulted, a record naming `field`.
    pub fn record(self, field: &str) -> (T, Option<DefaultedInput>) {
        match self {
            Parsed::Clean(value) => (value, None),
            Parsed::Defaulted { value, reason } => (
                value,
                Some(DefaultedInput {
                    field: field.to_string(),
                    reason,
                }),
            ),
        }
    }
}

/// A named input field that was substituted with its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultedInput {
    /// The field name.
    pub field: String,
    /// Why the default was used.
    pub reason: DefaultReason,
}

/// Largest magnitude accepted for an amount: 10^15.
///
/// Anything bigger is treated as malformed so that pay arithmetic stays
/// within `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xa4c6_8000, 0x0003_8d7e, 0, false, 0);

/// Checks that an already-typed amount is within [`MAX_AMOUNT`].
///
/// Out-of-range values are `Malformed` and default to zero.
///
/// ```
/// use payroll_engine::parsing::bounded_amount;
/// use rust_decimal::Decimal;
///
/// assert!(!bounded_amount(Decimal::new(1_500_000, 0)).is_defaulted());
/// assert_eq!(bounded_amount(Decimal::MAX).into_value(), Decimal::ZERO);
/// ```
pub fn bounded_amount(value: Decimal) -> Parsed<Decimal> {
    if value.abs() <= MAX_AMOUNT {
        Parsed::Clean(value)
    } else {
        Parsed::malformed(Decimal::ZERO, &value.to_string())
    }
}

fn read_decimal(text: &str, raw: &str) -> Parsed<Decimal> {
    match Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)) {
        Ok(value) if value.abs() <= MAX_AMOUNT => Parsed::Clean(value),
        _ => Parsed::malformed(Decimal::ZERO, raw),
    }
}

/// Parses a monetary or day-count amount.
///
/// Spaces and (narrow) no-break spaces are stripped and a comma is accepted
/// as the decimal separator. Empty input is `Missing`; anything else that
/// does not parse, or exceeds [`MAX_AMOUNT`], is `Malformed`. Both default
/// to zero.
pub fn parse_amount(raw: &str) -> Parsed<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{202f}' | '\u{a0}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Parsed::missing(Decimal::ZERO);
    }

    read_decimal(&cleaned, raw)
}

/// Parses an amount carried in a JSON value.
///
/// An absent or `null` value yields `missing_default`; numbers and strings are
/// parsed; any other JSON type is malformed and defaults to zero.
pub fn amount_from_json(value: Option<&Value>, missing_default: Decimal) -> Parsed<Decimal> {
    match value {
        None | Some(Value::Null) => Parsed::missing(missing_default),
        Some(Value::Number(number)) => {
            let text = number.to_string();
            read_decimal(&text, &text)
        }
        Some(Value::String(text)) => match parse_amount(text) {
            Parsed::Defaulted {
                reason: DefaultReason::Missing,
                ..
            } => Parsed::malformed(Decimal::ZERO, text),
            parsed => parsed,
        },
        Some(other) => Parsed::malformed(Decimal::ZERO, &other.to_string()),
    }
}

/// Parses an integer by keeping only digits and minus signs.
pub fn parse_integer(raw: &str) -> Parsed<i64> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    if digits.is_empty() || digits == "-" {
        return if raw.trim().is_empty() {
            Parsed::missing(0)
        } else {
            Parsed::malformed(0, raw)
        };
    }

    digits
        .parse()
        .map(Parsed::Clean)
        .unwrap_or_else(|_| Parsed::malformed(0, raw))
}

/// Parses a hire date.
///
/// Accepted formats: `DD/MM/YYYY`, `YYYY-MM-DD` and `DD/MM/YY`. Anything else
/// yields no date.
///
/// ```
/// use payroll_engine::parsing::parse_hire_date;
/// use chrono::NaiveDate;
///
/// let expected = NaiveDate::from_ymd_opt(2021, 3, 15);
/// assert_eq!(parse_hire_date("15/03/2021").into_value(), expected);
/// assert_eq!(parse_hire_date("2021-03-15").into_value(), expected);
/// assert_eq!(parse_hire_date("15/03/21").into_value(), expected);
/// assert_eq!(parse_hire_date("").into_value(), None);
/// ```
pub fn parse_hire_date(raw: &str) -> Parsed<Option<NaiveDate>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Parsed::missing(None);
    }

    let format = match trimmed.rsplit_once('/') {
        Some((_, year)) if year.len() == 2 => "%d/%m/%y",
        Some(_) => "%d/%m/%Y",
        None => "%Y-%m-%d",
    };

    NaiveDate::parse_from_str(trimmed, format)
        .map(|date| Parsed::Clean(Some(date)))
        .unwrap_or_else(|_| Parsed::malformed(None, raw))
}

const FRENCH_MONTHS: [&str; 12] = [
    "janvier",
    "fevrier",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "aout",
    "septembre",
    "octobre",
    "novembre",
    "decembre",
];

fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'û' | 'ù' | 'ü' => 'u',
            'â' | 'à' => 'a',
            'ô' => 'o',
            'î' | 'ï' => 'i',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Parses a month given as a number (`3`, `03`) or a French month name.
///
/// Returns 0 when the input names no month.
///
/// ```
/// use payroll_engine::parsing::parse_month;
///
/// assert_eq!(parse_month("03").into_value(), 3);
/// assert_eq!(parse_month("Février").into_value(), 2);
/// assert_eq!(parse_month("aout").into_value(), 8);
/// assert_eq!(parse_month("13").into_value(), 0);
/// ```
pub fn parse_month(raw: &str) -> Parsed<u32> {
    let normalized = strip_accents(&raw.trim().to_lowercase());
    if normalized.is_empty() {
        return Parsed::missing(0);
    }

    if let Ok(month) = normalized.parse::<u32>() {
        return if (1..=12).contains(&month) {
            Parsed::Clean(month)
        } else {
            Parsed::malformed(0, raw)
        };
    }

    FRENCH_MONTHS
        .iter()
        .position(|name| *name == normalized)
        .map(|index| Parsed::Clean(index as u32 + 1))
        .unwrap_or_else(|| Parsed::malformed(0, raw))
}

/// Parses a `YYYY-MM` month stamp.
pub fn parse_year_month(raw: &str) -> Parsed<Option<YearMonth>> {
    if raw.trim().is_empty() {
        return Parsed::missing(None);
    }
    raw.parse::<YearMonth>()
        .map(|stamp| Parsed::Clean(Some(stamp)))
        .unwrap_or_else(|_| Parsed::malformed(None, raw))
}
