//! Field, group and list validation rules

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::dates;
use super::result::RuleFailure;
use crate::error::SchemaError;
use crate::state::forms::FieldValue;

/// Inputs rules need besides the value itself
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub today: NaiveDate,
}

/// A compiled regular expression that serializes as its source text
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, SchemaError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| SchemaError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pattern::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Rule applied to a single field's value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Text must be non-empty. Booleans and numbers are always present.
    Required,
    /// Boolean must be true
    RequiredTrue,
    MinLength { min: usize },
    MaxLength { max: usize },
    Pattern { pattern: Pattern },
    Email,
    /// Calendar date on or before today
    NotFutureDate,
    /// Calendar age in whole years
    MinimumAge { years: u32 },
    Min { min: f64 },
    Max { max: f64 },
}

impl Rule {
    pub fn min_length(min: usize) -> Self {
        Rule::MinLength { min }
    }

    pub fn max_length(max: usize) -> Self {
        Rule::MaxLength { max }
    }

    pub fn pattern(pattern: &str) -> Result<Self, SchemaError> {
        Ok(Rule::Pattern {
            pattern: Pattern::new(pattern)?,
        })
    }

    pub fn minimum_age(years: u32) -> Self {
        Rule::MinimumAge { years }
    }

    /// Stable identifier reported when the rule fails
    pub fn id(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::RequiredTrue => "required_true",
            Rule::MinLength { .. } => "min_length",
            Rule::MaxLength { .. } => "max_length",
            Rule::Pattern { .. } => "pattern",
            Rule::Email => "email",
            Rule::NotFutureDate => "not_future_date",
            Rule::MinimumAge { .. } => "minimum_age",
            Rule::Min { .. } => "min",
            Rule::Max { .. } => "max",
        }
    }

    /// Default message for presentation layers
    pub fn message(&self) -> String {
        match self {
            Rule::Required => "This field is required".to_string(),
            Rule::RequiredTrue => "This box must be checked".to_string(),
            Rule::MinLength { min } => format!("Must be at least {min} characters"),
            Rule::MaxLength { max } => format!("Must be at most {max} characters"),
            Rule::Pattern { .. } => "Invalid format".to_string(),
            Rule::Email => "Please enter a valid email".to_string(),
            Rule::NotFutureDate => "Date cannot be in the future".to_string(),
            Rule::MinimumAge { years } => format!("You must be at least {years} years old"),
            Rule::Min { min } => format!("Must be at least {min}"),
            Rule::Max { max } => format!("Must be at most {max}"),
        }
    }

    /// Check a value against this rule
    pub fn check(&self, value: &FieldValue, ctx: &RuleContext) -> bool {
        match (self, value) {
            (Rule::Required, FieldValue::Text(s)) => !s.is_empty(),
            (Rule::Required, _) => true,
            (Rule::RequiredTrue, FieldValue::Bool(b)) => *b,
            (Rule::RequiredTrue, _) => false,
            (Rule::MinLength { min }, FieldValue::Text(s)) => {
                s.is_empty() || s.chars().count() >= *min
            }
            (Rule::MaxLength { max }, FieldValue::Text(s)) => s.chars().count() <= *max,
            (Rule::Pattern { pattern }, FieldValue::Text(s)) => {
                s.is_empty() || pattern.is_match(s)
            }
            (Rule::Pattern { pattern }, FieldValue::Number(n)) => pattern.is_match(&n.to_string()),
            (Rule::Email, FieldValue::Text(s)) => {
                s.is_empty() || email_address::EmailAddress::is_valid(s)
            }
            (Rule::NotFutureDate, FieldValue::Text(s)) => dates::is_not_future(s, ctx.today),
            (Rule::MinimumAge { years }, FieldValue::Text(s)) => {
                dates::meets_minimum_age(s, *years, ctx.today)
            }
            (Rule::Min { min }, v) => numeric(v).map_or(true, |n| n >= *min),
            (Rule::Max { max }, v) => numeric(v).map_or(true, |n| n <= *max),
            _ => true,
        }
    }
}

/// Numeric reading of a value; empty or non-numeric text has none
fn numeric(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse().ok(),
        FieldValue::Bool(_) => None,
    }
}

/// Run every rule in order and collect the failures
pub fn evaluate(rules: &[Rule], value: &FieldValue, ctx: &RuleContext) -> Vec<RuleFailure> {
    rules
        .iter()
        .filter(|rule| !rule.check(value, ctx))
        .map(|rule| RuleFailure::new(rule.id(), rule.message()))
        .collect()
}

/// Rule applied across the direct children of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum GroupRule {
    /// Two sibling fields must hold equal values
    FieldsMatch { first: String, second: String },
    /// At least one of the named sibling fields must be filled in
    AnyFilled { keys: Vec<String> },
}

impl GroupRule {
    pub fn id(&self) -> &'static str {
        match self {
            GroupRule::FieldsMatch { .. } => "fields_match",
            GroupRule::AnyFilled { .. } => "any_filled",
        }
    }

    pub fn message(&self) -> String {
        match self {
            GroupRule::FieldsMatch { first, second } => format!("{first} and {second} must match"),
            GroupRule::AnyFilled { keys } => format!("Fill in at least one of: {}", keys.join(", ")),
        }
    }

    /// Child keys the rule reads
    pub fn keys(&self) -> Vec<&str> {
        match self {
            GroupRule::FieldsMatch { first, second } => vec![first.as_str(), second.as_str()],
            GroupRule::AnyFilled { keys } => keys.iter().map(String::as_str).collect(),
        }
    }

    /// `lookup` resolves a child key to its field value, if the child is a field
    pub fn check<'a>(&self, lookup: impl Fn(&str) -> Option<&'a FieldValue>) -> bool {
        match self {
            GroupRule::FieldsMatch { first, second } => {
                lookup(first.as_str()) == lookup(second.as_str())
            }
            GroupRule::AnyFilled { keys } => keys
                .iter()
                .any(|key| lookup(key.as_str()).is_some_and(FieldValue::is_filled)),
        }
    }
}

/// Rule applied to a repeated-control list as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ListRule {
    AtLeastOneSelected,
    MaxSelected { max: usize },
}

impl ListRule {
    pub fn id(&self) -> &'static str {
        match self {
            ListRule::AtLeastOneSelected => "at_least_one_selected",
            ListRule::MaxSelected { .. } => "max_selected",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ListRule::AtLeastOneSelected => "Select at least one option".to_string(),
            ListRule::MaxSelected { max } => format!("Select at most {max} options"),
        }
    }

    pub fn check(&self, selected: usize) -> bool {
        match self {
            ListRule::AtLeastOneSelected => selected > 0,
            ListRule::MaxSelected { max } => selected <= *max,
        }
    }
}
