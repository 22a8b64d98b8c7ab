//! Form domain layer
//!
//! A form is a tree of [`FormNode`]s owned by a [`FormTree`]. Reactive links
//! attach and detach rules on one subtree based on another field's value.

mod field;
mod form_state;
mod link;
mod node;

pub use field::{FieldValue, FormField, ValidityState, ValueKind};
pub use form_state::{FormTree, SubmitOutcome};
pub use link::{LinkedRules, Predicate, ReactiveLink};
pub use node::{FormGroup, FormList, FormNode, NodeRef};
