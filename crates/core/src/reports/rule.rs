//! Mapping-rule engine.
//!
//! A rule is a comma-separated list of account patterns, optionally wrapped
//! in `ABS(...)`:
//!
//! ```text
//! 70*, -709        revenue minus returns
//! ABS(284*)        contra-account shown positive
//! 4011             one account
//! ```
//!
//! Each pattern is an exact code or a prefix ending in `*`, optionally
//! negated with a leading `-`. Rules are parsed once into a [`MappingRule`]
//! and evaluated against `{code → net balance}` maps.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a rule string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The rule has no pattern.
    #[error("Rule is empty")]
    Empty,

    /// A pattern holds characters other than an account code and `*`.
    #[error("Invalid pattern '{0}'")]
    InvalidPattern(String),

    /// `ABS(` without its closing parenthesis.
    #[error("Unclosed ABS( in rule '{0}'")]
    UnclosedAbs(String),
}

impl RuleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "EMPTY_RULE",
            Self::InvalidPattern(_) => "INVALID_PATTERN",
            Self::UnclosedAbs(_) => "UNCLOSED_ABS",
        }
    }
}

/// How a pattern selects accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum Matcher {
    /// Every account whose code starts with the prefix.
    Prefix(String),
    /// The account with exactly this code.
    Exact(String),
}

/// One signed pattern of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Account selection.
    pub matcher: Matcher,
    /// Whether the contribution is subtracted.
    pub negate: bool,
}

impl Pattern {
    /// Sum of the net balances this pattern selects, sign applied.
    #[must_use]
    pub fn contribution(&self, balances: &BTreeMap<String, Decimal>) -> Decimal {
        let total = match &self.matcher {
            Matcher::Exact(code) => balances.get(code).copied().unwrap_or(Decimal::ZERO),
            Matcher::Prefix(prefix) => balances
                .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
                .take_while(|(code, _)| code.starts_with(prefix.as_str()))
                .map(|(_, amount)| *amount)
                .sum(),
        };
        if self.negate { -total } else { total }
    }
}

impl FromStr for Pattern {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (negate, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, raw),
        };
        let (is_prefix, code) = match body.strip_suffix('*') {
            Some(code) => (true, code),
            None => (false, body),
        };

        if code.is_empty() && !is_prefix {
            return Err(RuleError::InvalidPattern(raw.to_string()));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(RuleError::InvalidPattern(raw.to_string()));
        }

        let matcher = if is_prefix {
            Matcher::Prefix(code.to_string())
        } else {
            Matcher::Exact(code.to_string())
        };
        Ok(Self { matcher, negate })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            f.write_str("-")?;
        }
        match &self.matcher {
            Matcher::Prefix(prefix) => write!(f, "{prefix}*"),
            Matcher::Exact(code) => f.write_str(code),
        }
    }
}

/// A parsed mapping rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// Signed patterns, summed in order.
    pub patterns: Vec<Pattern>,
    /// Whether the total is reported as an absolute value.
    pub abs: bool,
}

impl MappingRule {
    /// Evaluates the rule, rounding half-to-even at two decimal places.
    #[must_use]
    pub fn evaluate(&self, balances: &BTreeMap<String, Decimal>) -> Decimal {
        let total: Decimal = self
            .patterns
            .iter()
            .map(|pattern| pattern.contribution(balances))
            .sum();
        let total = if self.abs { total.abs() } else { total };
        total.round_dp(2)
    }
}

impl FromStr for MappingRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(RuleError::Empty);
        }

        let (abs, body) = match raw.get(..4) {
            Some(head) if head.eq_ignore_ascii_case("ABS(") => {
                let inner = raw[4..]
                    .trim_end()
                    .strip_suffix(')')
                    .ok_or_else(|| RuleError::UnclosedAbs(raw.to_string()))?;
                (true, inner)
            }
            _ => (false, raw),
        };

        // Blank items between commas are ignored
        let patterns = body
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::parse::<Pattern>)
            .collect::<Result<Vec<_>, _>>()?;
        if patterns.is_empty() {
            return Err(RuleError::Empty);
        }

        Ok(Self { patterns, abs })
    }
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self
            .patterns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        if self.abs {
            write!(f, "ABS({body})")
        } else {
            f.write_str(&body)
        }
    }
}

/// Parses and evaluates a rule string in one step.
///
/// # Errors
///
/// Returns a `RuleError` if the rule cannot be parsed.
pub fn evaluate(rule: &str, balances: &BTreeMap<String, Decimal>) -> Result<Decimal, RuleError> {
    Ok(rule.parse::<MappingRule>()?.evaluate(balances))
}
