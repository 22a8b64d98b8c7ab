//! formtree - dynamic validated form trees
//!
//! A form model organized as a tree of fields, groups and repeated-control
//! lists. Rule sets on one subtree can be switched on and off by the value of
//! another field, and a valid tree can be submitted into an ordered snapshot.

pub mod app;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod presets;
pub mod schema;
pub mod state;
pub mod validation;

pub use catalog::{CatalogEntry, CatalogProvider, StaticCatalog};
pub use clock::{Clock, FixedClock, LocalClock};
pub use config::EngineConfig;
pub use error::{FormError, Result, SchemaError};
pub use schema::{FieldSchema, FormSchema, GroupSchema, ListSchema, NodeSchema};
pub use state::{
    FieldPath, FieldValue, FormField, FormTree, Predicate, ReactiveLink, Snapshot, SnapshotValue,
    SubmitOutcome, ValidityState,
};
pub use validation::{GroupRule, ListRule, Rule, ValidationReport};
