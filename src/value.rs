//! Value parser: converts captured raw text into typed metric values.

use crate::error::ParseError;
use crate::schema::{CurrencyUnit, FieldSpec, NumberLocale, ValueKind};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::str::FromStr;

/// Typed value of one extracted metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Whole count.
    Count(u64),
    /// Percentage in the 0–100 range.
    Percent(Decimal),
    /// Currency amount in the field's canonical unit.
    Amount(Decimal),
    /// Ordinal percentile in the 0–100 range.
    Percentile(Decimal),
    /// Presence flag.
    Flag(bool),
}

impl MetricValue {
    /// Numeric magnitude: counts and decimals as-is, flags as 1/0.
    #[must_use]
    pub fn as_decimal(&self) -> Decimal {
        match self {
            Self::Count(n) => Decimal::from(*n),
            Self::Percent(d) | Self::Amount(d) | Self::Percentile(d) => *d,
            Self::Flag(true) => Decimal::ONE,
            Self::Flag(false) => Decimal::ZERO,
        }
    }

    /// The flag value, when this is a presence flag.
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Percent(d) => write!(f, "{d}%"),
            Self::Amount(d) => write!(f, "{d}"),
            Self::Percentile(d) => write!(f, "{d}th percentile"),
            Self::Flag(true) => write!(f, "yes"),
            Self::Flag(false) => write!(f, "no"),
        }
    }
}

/// Parse outcome: the typed value plus an ambiguity marker the scorer uses
/// to break ties between same-strategy candidates.
#[derive(Debug, Clone)]
pub(crate) struct Parsed {
    pub value: MetricValue,
    pub ambiguous: bool,
}

/// Converts one candidate's raw text according to the field's kind.
pub(crate) fn parse(raw: &str, spec: &FieldSpec) -> Result<Parsed, ParseError> {
    match spec.kind() {
        ValueKind::Integer => parse_integer(raw, spec.locale()),
        ValueKind::Percentage => parse_percent(raw, spec.locale(), false),
        ValueKind::Percentile => parse_percent(raw, spec.locale(), true),
        ValueKind::Currency => {
            // Validated at schema load; currency fields always carry a unit.
            let unit = spec.currency_unit().unwrap_or(CurrencyUnit::Rupees);
            parse_currency(raw, spec.locale(), unit)
        }
        ValueKind::Boolean => Ok(Parsed {
            value: MetricValue::Flag(true),
            ambiguous: false,
        }),
    }
}

/// Strips grouping separators per the locale and parses a decimal.
fn normalize_decimal(raw: &str, locale: NumberLocale) -> Result<Decimal, ParseError> {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match (locale, ch) {
            (_, ' ' | '\u{a0}' | '\u{202f}' | '+') => {}
            (NumberLocale::CommaGrouped, ',') | (NumberLocale::PeriodGrouped, '.') => {}
            (NumberLocale::PeriodGrouped, ',') => cleaned.push('.'),
            _ => cleaned.push(ch),
        }
    }
    Decimal::from_str(&cleaned).map_err(|_| ParseError::Number {
        value: raw.trim().to_string(),
    })
}

fn parse_integer(raw: &str, locale: NumberLocale) -> Result<Parsed, ParseError> {
    let value = normalize_decimal(raw, locale)?;
    if !value.fract().is_zero() {
        return Err(ParseError::Number {
            value: raw.trim().to_string(),
        });
    }
    let count = value.to_u64().ok_or_else(|| ParseError::Number {
        value: raw.trim().to_string(),
    })?;
    // Space grouping and decimal-pointed integers read fine but could hide a
    // different grouping convention.
    let decimal_point = match locale {
        NumberLocale::CommaGrouped => '.',
        NumberLocale::PeriodGrouped => ',',
    };
    let ambiguous = raw.contains([' ', '\u{a0}', decimal_point]);
    Ok(Parsed {
        value: MetricValue::Count(count),
        ambiguous,
    })
}

fn parse_percent(raw: &str, locale: NumberLocale, ordinal: bool) -> Result<Parsed, ParseError> {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();
    let mut end = trimmed.len();
    let mut marked = false;
    for suffix in ["%", "per cent", "percent", "percentile"] {
        if lower.ends_with(suffix) {
            end = trimmed.len() - suffix.len();
            marked = true;
            break;
        }
    }
    let mut number = trimmed[..end].trim_end();
    // "85th" → "85"
    let lower_number = number.to_lowercase();
    for ordinal_suffix in ["st", "nd", "rd", "th"] {
        if lower_number.ends_with(ordinal_suffix)
            && lower_number[..lower_number.len() - 2].ends_with(|c: char| c.is_ascii_digit())
        {
            number = number[..number.len() - 2].trim_end();
            break;
        }
    }
    let value = normalize_decimal(number, locale)?;
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ParseError::Range {
            value: trimmed.to_string(),
        });
    }
    Ok(Parsed {
        value: if ordinal {
            MetricValue::Percentile(value)
        } else {
            MetricValue::Percent(value)
        },
        ambiguous: !marked,
    })
}

/// Rupees represented by one unit of a recognized suffix.
fn suffix_factor(unit: &str) -> Option<Decimal> {
    match unit {
        "lakh" | "lakhs" | "lac" | "lacs" | "lpa" => Some(Decimal::from(100_000_u32)),
        "crore" | "crores" | "cr" => Some(Decimal::from(10_000_000_u32)),
        "k" | "thousand" => Some(Decimal::from(1_000_u32)),
        "million" | "mn" => Some(Decimal::from(1_000_000_u32)),
        _ => None,
    }
}

fn parse_currency(
    raw: &str,
    locale: NumberLocale,
    canonical: CurrencyUnit,
) -> Result<Parsed, ParseError> {
    let lower = raw.trim().to_lowercase();
    let mut rest = lower.as_str();
    let mut had_symbol = false;
    for symbol in ["₹", "rs.", "rs", "inr", "$"] {
        if let Some(stripped) = rest.strip_prefix(symbol) {
            rest = stripped.trim_start();
            had_symbol = true;
            break;
        }
    }
    let split = rest
        .find(|c: char| c.is_alphabetic())
        .unwrap_or(rest.len());
    let (number_part, unit_part) = rest.split_at(split);
    let unit_part = unit_part.trim().trim_end_matches('.');
    let number = normalize_decimal(number_part, locale)?;

    if unit_part.is_empty() {
        if had_symbol {
            // Symbol-only amounts are plain rupees; convert to canonical.
            return Ok(Parsed {
                value: MetricValue::Amount(number / canonical.rupee_factor()),
                ambiguous: false,
            });
        }
        // No symbol, no unit: take the number as already canonical.
        return Ok(Parsed {
            value: MetricValue::Amount(number),
            ambiguous: true,
        });
    }

    let factor = suffix_factor(unit_part).ok_or_else(|| ParseError::Unit {
        value: raw.trim().to_string(),
        unit: unit_part.to_string(),
    })?;
    Ok(Parsed {
        value: MetricValue::Amount(number * factor / canonical.rupee_factor()),
        ambiguous: false,
    })
}
