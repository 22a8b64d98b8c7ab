//! Validation rules for form trees.
//!
//! Field rules check a single value, group rules check the direct children of
//! a group, and list rules check a repeated-control list as a whole. All rules
//! are synchronous.
//!
//! # Example
//!
//! ```
//! use formtree::validation::{Rule, RuleContext};
//! use formtree::FieldValue;
//!
//! let ctx = RuleContext { today: chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap() };
//! let rule = Rule::minimum_age(10);
//! assert!(rule.check(&FieldValue::Text("2016-10-18".into()), &ctx));
//! assert!(!rule.check(&FieldValue::Text("2016-10-19".into()), &ctx));
//! ```

pub mod dates;
mod result;
mod rules;

pub use result::{NodeErrors, RuleFailure, ValidationReport};
pub use rules::{evaluate, GroupRule, ListRule, Pattern, Rule, RuleContext};
