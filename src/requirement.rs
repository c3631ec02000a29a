//! # Ingredient Requirement Parser
//!
//! Turns recipe ingredient lines into a name plus a required quantity.
//!
//! ## Supported formats
//!
//! - `"2 pcs Eggs"`: amount, unit, name
//! - `"0.5 bag Spinach"`, `"0,5 l Milk"`: decimals with `.` or `,`
//! - `"1/2 cup Sugar"`, `"1 1/2 cups Flour"`: fractions and mixed numbers
//! - `"2-3 tbsp Olive oil"`: ranges, the midpoint is required
//! - `"500g Butter"`: unit attached to the number
//! - `"2 fl oz Cream"`: two-word units
//! - `"3 eggs"`: quantity-only lines, counted in pieces
//!
//! A line whose amount cannot be read still yields a requirement, with no
//! amount. Such a requirement can never be satisfied.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::model::Quantity;
use crate::units::is_known_unit;

lazy_static! {
    static ref EXACT: Regex = Regex::new(r"^(?:\d+(?:[.,]\d+)?|[.,]\d+)$").expect("exact amount pattern should be valid");
    static ref FRACTION: Regex = Regex::new(r"^(\d+)[⁄/](\d+)$").expect("fraction pattern should be valid");
    static ref RANGE: Regex = Regex::new(r"^(\d+(?:[.,]\d+)?)\s*[-–]\s*(\d+(?:[.,]\d+)?)$").expect("range pattern should be valid");
    static ref ATTACHED_UNIT: Regex = Regex::new(r"^(\d+(?:[.,]\d+)?)(\p{L}[\p{L}.]*)$").expect("attached unit pattern should be valid");
}

/// Unit assumed for quantity-only lines such as `"3 eggs"`
const COUNT_UNIT: &str = "pcs";

/// A parsed ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRequirement {
    /// Original line
    pub raw: String,
    /// Ingredient name used for ledger matching
    pub name: String,
    /// Required amount, `None` when the line could not be parsed
    pub amount: Option<Quantity>,
}

impl IngredientRequirement {
    /// Parse an ingredient line; never fails
    pub fn parse(line: &str) -> Self {
        let raw = line.trim().to_string();
        match split_requirement(&raw) {
            Ok((value, unit, name)) => Self {
                name,
                amount: Some(Quantity::new(value, &unit)),
                raw,
            },
            Err(e) => {
                debug!(line = %raw, error = %e, "Ingredient line has no usable amount");
                Self {
                    name: raw.clone(),
                    amount: None,
                    raw,
                }
            }
        }
    }

    /// Whether an amount was read from the line
    pub fn is_parsable(&self) -> bool {
        self.amount.is_some()
    }
}

impl fmt::Display for IngredientRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.amount {
            Some(amount) => write!(f, "{} {}", amount, self.name),
            None => write!(f, "? {}", self.name),
        }
    }
}

/// Split a line into amount, unit and name
fn split_requirement(line: &str) -> Result<(f64, String, String), AmountParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(AmountParseError::Empty);
    }

    // "500g Butter"
    if let Some(captures) = ATTACHED_UNIT.captures(tokens[0]) {
        let value = parse_amount(&captures[1])?;
        return Ok((value, captures[2].to_string(), tokens[1..].join(" ")));
    }

    // "1 1/2 cups Flour"
    let (value, mut rest) = match tokens.get(1) {
        Some(second) if EXACT.is_match(tokens[0]) && FRACTION.is_match(second) => {
            (parse_amount(tokens[0])? + parse_amount(second)?, &tokens[2..])
        }
        _ => (parse_amount(tokens[0])?, &tokens[1..]),
    };

    if rest.is_empty() {
        return Err(AmountParseError::MissingUnit);
    }

    // "2 fl oz Cream"
    if rest.len() >= 2 {
        let two_words = format!("{} {}", rest[0], rest[1]);
        if is_known_unit(&two_words) {
            return Ok((value, two_words, rest[2..].join(" ")));
        }
    }

    // "3 eggs"
    if rest.len() == 1 && !is_known_unit(rest[0]) {
        return Ok((value, COUNT_UNIT.to_string(), rest[0].to_string()));
    }

    let unit = rest[0].to_string();
    rest = &rest[1..];
    Ok((value, unit, rest.join(" ")))
}

/// Parse a single amount token: integer, decimal, fraction or range
pub fn parse_amount(token: &str) -> Result<f64, AmountParseError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let value = if let Some(captures) = RANGE.captures(token) {
        let min = parse_decimal(&captures[1])?;
        let max = parse_decimal(&captures[2])?;
        (min + max) / 2.0
    } else if let Some(captures) = FRACTION.captures(token) {
        let numerator: f64 = captures[1]
            .parse()
            .map_err(|_| AmountParseError::InvalidNumber(token.to_string()))?;
        let denominator: f64 = captures[2]
            .parse()
            .map_err(|_| AmountParseError::InvalidNumber(token.to_string()))?;
        if denominator == 0.0 {
            return Err(AmountParseError::DivisionByZero);
        }
        numerator / denominator
    } else if EXACT.is_match(token) {
        parse_decimal(token)?
    } else {
        return Err(AmountParseError::InvalidNumber(token.to_string()));
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(AmountParseError::InvalidNumber(token.to_string()))
    }
}

fn parse_decimal(token: &str) -> Result<f64, AmountParseError> {
    token
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| AmountParseError::InvalidNumber(token.to_string()))
}

/// Errors that can occur while reading an amount
#[derive(Debug, Clone, PartialEq)]
pub enum AmountParseError {
    Empty,
    InvalidNumber(String),
    DivisionByZero,
    MissingUnit,
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountParseError::Empty => write!(f, "Empty ingredient line"),
            AmountParseError::InvalidNumber(token) => write!(f, "Invalid number format: {token}"),
            AmountParseError::DivisionByZero => write!(f, "Division by zero in fraction"),
            AmountParseError::MissingUnit => write!(f, "Amount without unit or name"),
        }
    }
}

impl std::error::Error for AmountParseError {}
