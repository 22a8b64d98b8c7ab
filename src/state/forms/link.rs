//! Reactive links: rule sets on one subtree governed by another field's value

use serde::{Deserialize, Serialize};

use super::field::FieldValue;
use crate::state::FieldPath;
use crate::validation::Rule;

/// Condition over a source field's value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Predicate {
    IsTrue,
    IsFalse,
    Equals { value: FieldValue },
    Filled,
}

impl Predicate {
    pub fn test(&self, value: &FieldValue) -> bool {
        match self {
            Predicate::IsTrue => matches!(value, FieldValue::Bool(true)),
            Predicate::IsFalse => matches!(value, FieldValue::Bool(false)),
            Predicate::Equals { value: expected } => value == expected,
            Predicate::Filled => value.is_filled(),
        }
    }
}

/// Rules for one field, addressed relative to the link target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRules {
    pub path: FieldPath,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Swaps the rules of the `target` subtree between `active` and `inactive`
/// whenever the predicate over `source` changes its truth value.
///
/// Every field named by either set gets exactly the rules of the chosen set
/// (none if the chosen set does not name it). While the predicate is false the
/// target projects to `null` in submission snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactiveLink {
    pub source: FieldPath,
    pub predicate: Predicate,
    pub target: FieldPath,
    #[serde(default)]
    pub active: Vec<LinkedRules>,
    #[serde(default)]
    pub inactive: Vec<LinkedRules>,
    /// Restore the target's initial values when the predicate turns false
    #[serde(default)]
    pub clear_on_deactivate: bool,
}

impl ReactiveLink {
    pub fn new(
        source: impl Into<FieldPath>,
        predicate: Predicate,
        target: impl Into<FieldPath>,
    ) -> Self {
        Self {
            source: source.into(),
            predicate,
            target: target.into(),
            active: Vec::new(),
            inactive: Vec::new(),
            clear_on_deactivate: false,
        }
    }

    /// Rules attached to `path` (relative to the target) while the predicate holds
    pub fn when_active(mut self, path: impl Into<FieldPath>, rules: Vec<Rule>) -> Self {
        self.active.push(LinkedRules {
            path: path.into(),
            rules,
        });
        self
    }

    /// Rules attached to `path` (relative to the target) while the predicate fails
    pub fn when_inactive(mut self, path: impl Into<FieldPath>, rules: Vec<Rule>) -> Self {
        self.inactive.push(LinkedRules {
            path: path.into(),
            rules,
        });
        self
    }

    pub fn clear_on_deactivate(mut self, clear: bool) -> Self {
        self.clear_on_deactivate = clear;
        self
    }

    /// Relative paths named by either rule set, without duplicates
    pub(crate) fn governed_paths(&self) -> Vec<&FieldPath> {
        let mut paths: Vec<&FieldPath> = Vec::new();
        for entry in self.active.iter().chain(&self.inactive) {
            if !paths.contains(&&entry.path) {
                paths.push(&entry.path);
            }
        }
        paths
    }

    /// Rules the chosen set assigns to `path`
    pub(crate) fn rules_for(&self, path: &FieldPath, active: bool) -> Vec<Rule> {
        let set = if active { &self.active } else { &self.inactive };
        set.iter()
            .filter(|entry| &entry.path == path)
            .flat_map(|entry| entry.rules.iter().cloned())
            .collect()
    }
}

/// A registered link and the truth value it last applied
#[derive(Debug, Clone)]
pub(crate) struct LinkState {
    pub(crate) link: ReactiveLink,
    pub(crate) applied: Option<bool>,
}
