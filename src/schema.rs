//! Form schemas: the declared shape, initial values, rules and links of a tree
//!
//! Schemas are plain data. They can be assembled with the builder methods or
//! loaded from JSON:
//!
//! ```
//! use formtree::schema::{FieldSchema, FormSchema, GroupSchema};
//! use formtree::validation::Rule;
//!
//! let schema = FormSchema::new()
//!     .group(
//!         GroupSchema::new("address")
//!             .field(FieldSchema::text("city", "").rule(Rule::Required))
//!             .field(FieldSchema::text("digitalAddress", "")),
//!     );
//! let json = schema.to_json().unwrap();
//! assert_eq!(FormSchema::from_json(&json).unwrap(), schema);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogEntry, CatalogProvider};
use crate::state::forms::{FieldValue, ReactiveLink};
use crate::validation::{GroupRule, ListRule, Rule};

/// Declaration of one child of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeSchema {
    Field(FieldSchema),
    Group(GroupSchema),
    List(ListSchema),
}

impl NodeSchema {
    pub fn key(&self) -> &str {
        match self {
            NodeSchema::Field(f) => &f.key,
            NodeSchema::Group(g) => &g.key,
            NodeSchema::List(l) => &l.key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub key: String,
    pub initial: FieldValue,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl FieldSchema {
    pub fn new(key: &str, initial: FieldValue) -> Self {
        Self {
            key: key.to_string(),
            initial,
            rules: Vec::new(),
        }
    }

    pub fn text(key: &str, initial: &str) -> Self {
        Self::new(key, FieldValue::Text(initial.to_string()))
    }

    pub fn checkbox(key: &str, initial: bool) -> Self {
        Self::new(key, FieldValue::Bool(initial))
    }

    pub fn number(key: &str, initial: f64) -> Self {
        Self::new(key, FieldValue::Number(initial))
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSchema {
    pub key: String,
    #[serde(default)]
    pub children: Vec<NodeSchema>,
    #[serde(default)]
    pub rules: Vec<GroupRule>,
}

impl GroupSchema {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.children.push(NodeSchema::Field(field));
        self
    }

    pub fn group(mut self, group: GroupSchema) -> Self {
        self.children.push(NodeSchema::Group(group));
        self
    }

    pub fn list(mut self, list: ListSchema) -> Self {
        self.children.push(NodeSchema::List(list));
        self
    }

    pub fn rule(mut self, rule: GroupRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// A repeated-control list: one checkbox per catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSchema {
    pub key: String,
    pub catalog: Vec<CatalogEntry>,
    /// Initial checkbox states; all unchecked when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Vec<bool>>,
    #[serde(default)]
    pub rules: Vec<ListRule>,
}

impl ListSchema {
    /// Read the entries from a catalog provider
    pub fn new(key: &str, catalog: &impl CatalogProvider) -> Self {
        Self::from_entries(key, catalog.entries())
    }

    pub fn from_entries(key: &str, catalog: Vec<CatalogEntry>) -> Self {
        Self {
            key: key.to_string(),
            catalog,
            initial: None,
            rules: Vec::new(),
        }
    }

    pub fn initial(mut self, initial: Vec<bool>) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn rule(mut self, rule: ListRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// The complete declaration of a form tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub children: Vec<NodeSchema>,
    #[serde(default)]
    pub rules: Vec<GroupRule>,
    #[serde(default)]
    pub links: Vec<ReactiveLink>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.children.push(NodeSchema::Field(field));
        self
    }

    pub fn group(mut self, group: GroupSchema) -> Self {
        self.children.push(NodeSchema::Group(group));
        self
    }

    pub fn list(mut self, list: ListSchema) -> Self {
        self.children.push(NodeSchema::List(list));
        self
    }

    pub fn rule(mut self, rule: GroupRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn link(mut self, link: ReactiveLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
