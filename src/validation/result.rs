use serde::Serialize;

use crate::state::FieldPath;

/// A single rule that failed during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    /// Stable rule identifier (e.g. `required`, `minimum_age`).
    pub rule: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl RuleFailure {
    pub fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// Failures attached to one node of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeErrors {
    pub path: FieldPath,
    pub failures: Vec<RuleFailure>,
}

/// Every invalid node in a tree, in depth-first order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: Vec<NodeErrors>,
}

impl ValidationReport {
    pub(crate) fn push(&mut self, path: FieldPath, failures: Vec<RuleFailure>) {
        if !failures.is_empty() {
            self.errors.push(NodeErrors { path, failures });
        }
    }

    /// Check if every node passed validation.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[NodeErrors] {
        &self.errors
    }

    /// Failures recorded for exactly `path`.
    pub fn failures_for(&self, path: &FieldPath) -> &[RuleFailure] {
        self.errors
            .iter()
            .find(|e| &e.path == path)
            .map(|e| e.failures.as_slice())
            .unwrap_or(&[])
    }

    /// Identifiers of the rules that failed at `path`.
    pub fn failed_rules(&self, path: &FieldPath) -> Vec<&'static str> {
        self.failures_for(path).iter().map(|f| f.rule).collect()
    }

    /// Path of the first invalid node (for focusing).
    pub fn first_invalid(&self) -> Option<&FieldPath> {
        self.errors.first().map(|e| &e.path)
    }

    pub fn invalid_paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.errors.iter().map(|e| &e.path)
    }
}
