//! Form field value objects

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{evaluate, Rule, RuleContext, RuleFailure};

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Number(f64),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::Number(_) => ValueKind::Number,
        }
    }

    /// Non-empty text, a checked box, or any number
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Bool(b) => *b,
            FieldValue::Number(_) => true,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(value.into())
    }
}

/// The kind of value a field holds; fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Bool,
    Number,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => f.write_str("text"),
            ValueKind::Bool => f.write_str("bool"),
            ValueKind::Number => f.write_str("number"),
        }
    }
}

/// Validity of a field as of its last evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityState {
    #[default]
    Unvalidated,
    Valid,
    Invalid,
    /// Reserved for asynchronous rules; never produced by synchronous evaluation
    Pending,
}

/// Represents a single form field with its rules, flags and value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    value: FieldValue,
    initial: FieldValue,
    rules: Vec<Rule>,
    touched: bool,
    dirty: bool,
    status: ValidityState,
    failures: Vec<RuleFailure>,
}

impl FormField {
    /// Create a field with an initial value and rule set
    pub fn new(name: &str, initial: FieldValue, rules: Vec<Rule>) -> Self {
        Self {
            name: name.to_string(),
            value: initial.clone(),
            initial,
            rules,
            touched: false,
            dirty: false,
            status: ValidityState::Unvalidated,
            failures: Vec::new(),
        }
    }

    /// Create a new text field
    pub fn text(name: &str, initial: &str) -> Self {
        Self::new(name, FieldValue::Text(initial.to_string()), Vec::new())
    }

    /// Create a new checkbox field
    pub fn checkbox(name: &str, initial: bool) -> Self {
        Self::new(name, FieldValue::Bool(initial), Vec::new())
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn initial(&self) -> &FieldValue {
        &self.initial
    }

    pub fn kind(&self) -> ValueKind {
        self.initial.kind()
    }

    /// Get the text value (returns empty string for non-text fields)
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    /// Get the checkbox value (returns false for non-boolean fields)
    pub fn as_bool(&self) -> bool {
        matches!(self.value, FieldValue::Bool(true))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> ValidityState {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == ValidityState::Valid
    }

    /// Rules that failed at the last evaluation
    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    /// Store a user-entered value and mark the field dirty.
    /// The caller checks the kind and re-evaluates.
    pub(crate) fn set_value(&mut self, value: FieldValue) {
        self.value = value;
        self.dirty = true;
    }

    /// Overwrite the value without marking the field dirty
    pub(crate) fn load_value(&mut self, value: FieldValue) {
        self.value = value;
    }

    pub(crate) fn set_rules(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
        self.status = ValidityState::Unvalidated;
    }

    pub(crate) fn set_touched(&mut self, touched: bool) {
        self.touched = touched;
    }

    /// Back to the declared initial value with clean flags
    pub(crate) fn restore_initial(&mut self) {
        self.value = self.initial.clone();
        self.dirty = false;
        self.touched = false;
        self.status = ValidityState::Unvalidated;
    }

    /// Forget presentation state and the last validity result
    pub(crate) fn clear_feedback(&mut self) {
        self.touched = false;
        self.status = ValidityState::Unvalidated;
        self.failures.clear();
    }

    /// Recompute validity against the currently attached rules
    pub(crate) fn evaluate(&mut self, ctx: &RuleContext) -> bool {
        self.failures = evaluate(&self.rules, &self.value, ctx);
        self.status = if self.failures.is_empty() {
            ValidityState::Valid
        } else {
            ValidityState::Invalid
        };
        self.is_valid()
    }
}
