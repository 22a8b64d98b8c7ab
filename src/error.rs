//! Error types for form construction and operations

use crate::state::FieldPath;
use crate::state::forms::ValueKind;

/// Malformed schema detected while building a tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate key '{key}' in group '{group}'")]
    DuplicateKey { group: FieldPath, key: String },

    #[error("key '{key}' in group '{group}' cannot be addressed by a path")]
    InvalidKey { group: FieldPath, key: String },

    #[error("group '{group}' has a rule naming '{key}', which is not a field of that group")]
    GroupRuleKey { group: FieldPath, key: String },

    #[error("list '{path}' declares {controls} controls but its catalog has {catalog} entries")]
    CatalogMismatch {
        path: FieldPath,
        controls: usize,
        catalog: usize,
    },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("link source '{0}' is not a field")]
    LinkSource(FieldPath),

    #[error("link target '{0}' does not exist")]
    LinkTarget(FieldPath),

    #[error("link rule path '{0}' does not name a field inside the target")]
    LinkRulePath(FieldPath),
}

/// Errors returned by the form engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("path not found: '{0}'")]
    PathNotFound(FieldPath),

    #[error("field '{path}' holds {expected} values, got {found}")]
    ValueKindMismatch {
        path: FieldPath,
        expected: ValueKind,
        found: ValueKind,
    },
}

pub type Result<T, E = FormError> = std::result::Result<T, E>;
