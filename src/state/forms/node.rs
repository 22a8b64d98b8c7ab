//! Tree nodes: fields, groups and repeated-control lists

use super::field::{FieldValue, FormField};
use crate::catalog::CatalogEntry;
use crate::state::{FieldPath, PathSegment};
use crate::validation::{GroupRule, ListRule, RuleContext, RuleFailure, ValidationReport};

/// A node of the form tree
#[derive(Debug, Clone)]
pub enum FormNode {
    Field(FormField),
    Group(FormGroup),
    List(FormList),
}

/// Borrowed view of whatever a path resolves to
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Node(&'a FormNode),
    /// One control of a repeated-control list
    Control(&'a FormField),
}

pub(crate) enum NodeMut<'a> {
    Node(&'a mut FormNode),
    Control(&'a mut FormField),
}

impl<'a> NodeRef<'a> {
    /// The field this path addresses, if it is a leaf
    pub fn as_field(self) -> Option<&'a FormField> {
        match self {
            NodeRef::Node(FormNode::Field(f)) | NodeRef::Control(f) => Some(f),
            NodeRef::Node(_) => None,
        }
    }

    pub fn as_list(self) -> Option<&'a FormList> {
        match self {
            NodeRef::Node(FormNode::List(l)) => Some(l),
            _ => None,
        }
    }

    pub fn is_valid(self) -> bool {
        match self {
            NodeRef::Node(n) => n.is_valid(),
            NodeRef::Control(f) => f.is_valid(),
        }
    }

    pub fn is_touched(self) -> bool {
        match self {
            NodeRef::Node(n) => n.is_touched(),
            NodeRef::Control(f) => f.is_touched(),
        }
    }
}

impl<'a> NodeMut<'a> {
    pub(crate) fn into_field(self) -> Option<&'a mut FormField> {
        match self {
            NodeMut::Node(FormNode::Field(f)) | NodeMut::Control(f) => Some(f),
            NodeMut::Node(_) => None,
        }
    }

    pub(crate) fn mark_touched(self, recursive: bool) {
        match self {
            NodeMut::Node(n) => n.mark_touched(recursive),
            NodeMut::Control(f) => f.set_touched(true),
        }
    }

    pub(crate) fn for_each_field_mut(self, f: &mut dyn FnMut(&mut FormField)) {
        match self {
            NodeMut::Node(n) => n.for_each_field_mut(f),
            NodeMut::Control(c) => f(c),
        }
    }
}

impl FormNode {
    pub fn as_field(&self) -> Option<&FormField> {
        match self {
            FormNode::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&FormGroup> {
        match self {
            FormNode::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Aggregate validity from cached field states and group/list rule results
    pub fn is_valid(&self) -> bool {
        match self {
            FormNode::Field(f) => f.is_valid(),
            FormNode::Group(g) => {
                g.failures.is_empty() && g.children.iter().all(|(_, child)| child.is_valid())
            }
            FormNode::List(l) => {
                l.failures.is_empty() && l.controls.iter().all(FormField::is_valid)
            }
        }
    }

    pub fn is_touched(&self) -> bool {
        match self {
            FormNode::Field(f) => f.is_touched(),
            FormNode::Group(g) => g.touched,
            FormNode::List(l) => l.touched,
        }
    }

    /// True if any field underneath was changed by the user
    pub fn is_dirty(&self) -> bool {
        match self {
            FormNode::Field(f) => f.is_dirty(),
            FormNode::Group(g) => g.children.iter().any(|(_, child)| child.is_dirty()),
            FormNode::List(l) => l.controls.iter().any(FormField::is_dirty),
        }
    }

    pub fn resolve(&self, segments: &[PathSegment]) -> Option<NodeRef<'_>> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(NodeRef::Node(self));
        };
        match self {
            FormNode::Group(g) => g.child(first)?.resolve(rest),
            FormNode::List(l) => match (first, rest) {
                (PathSegment::Index(i), []) => l.controls.get(*i).map(NodeRef::Control),
                _ => None,
            },
            FormNode::Field(_) => None,
        }
    }

    pub(crate) fn resolve_mut(&mut self, segments: &[PathSegment]) -> Option<NodeMut<'_>> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(NodeMut::Node(self));
        };
        match self {
            FormNode::Group(g) => g.child_mut(first)?.resolve_mut(rest),
            FormNode::List(l) => match (first, rest) {
                (PathSegment::Index(i), []) => l.controls.get_mut(*i).map(NodeMut::Control),
                _ => None,
            },
            FormNode::Field(_) => None,
        }
    }

    /// Mark this node touched, and every descendant when `recursive`
    pub(crate) fn mark_touched(&mut self, recursive: bool) {
        match self {
            FormNode::Field(f) => f.set_touched(true),
            FormNode::Group(g) => {
                g.touched = true;
                if recursive {
                    for (_, child) in &mut g.children {
                        child.mark_touched(true);
                    }
                }
            }
            FormNode::List(l) => {
                l.touched = true;
                if recursive {
                    for control in &mut l.controls {
                        control.set_touched(true);
                    }
                }
            }
        }
    }

    /// Clear touched flags on this node and everything underneath
    pub(crate) fn clear_touched(&mut self) {
        match self {
            FormNode::Field(f) => f.set_touched(false),
            FormNode::Group(g) => {
                g.touched = false;
                for (_, child) in &mut g.children {
                    child.clear_touched();
                }
            }
            FormNode::List(l) => {
                l.touched = false;
                for control in &mut l.controls {
                    control.set_touched(false);
                }
            }
        }
    }

    /// Depth-first visit of every leaf field, list controls included
    pub(crate) fn for_each_field_mut(&mut self, f: &mut dyn FnMut(&mut FormField)) {
        match self {
            FormNode::Field(field) => f(field),
            FormNode::Group(g) => {
                for (_, child) in &mut g.children {
                    child.for_each_field_mut(f);
                }
            }
            FormNode::List(l) => {
                for control in &mut l.controls {
                    f(control);
                }
            }
        }
    }

    /// Re-evaluate every field, then every group and list rule
    pub(crate) fn evaluate_all(&mut self, ctx: &RuleContext) {
        self.for_each_field_mut(&mut |field: &mut FormField| {
            field.evaluate(ctx);
        });
        self.refresh_aggregates();
    }

    /// Recompute group and list rule results from current field values
    pub(crate) fn refresh_aggregates(&mut self) {
        match self {
            FormNode::Field(_) => {}
            FormNode::Group(g) => {
                for (_, child) in &mut g.children {
                    child.refresh_aggregates();
                }
                g.failures = g.check_rules();
            }
            FormNode::List(l) => l.failures = l.check_rules(),
        }
    }

    pub(crate) fn collect_errors(&self, path: &FieldPath, report: &mut ValidationReport) {
        match self {
            FormNode::Field(f) => report.push(path.clone(), f.failures().to_vec()),
            FormNode::Group(g) => {
                report.push(path.clone(), g.failures.clone());
                for (key, child) in &g.children {
                    child.collect_errors(&path.key(key.as_str()), report);
                }
            }
            FormNode::List(l) => {
                report.push(path.clone(), l.failures.clone());
                for (i, control) in l.controls.iter().enumerate() {
                    report.push(path.index(i), control.failures().to_vec());
                }
            }
        }
    }
}

/// A named, ordered mapping of child nodes
#[derive(Debug, Clone, Default)]
pub struct FormGroup {
    children: Vec<(String, FormNode)>,
    rules: Vec<GroupRule>,
    failures: Vec<RuleFailure>,
    touched: bool,
}

impl FormGroup {
    pub fn new(children: Vec<(String, FormNode)>, rules: Vec<GroupRule>) -> Self {
        Self {
            children,
            rules,
            failures: Vec::new(),
            touched: false,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &FormNode)> {
        self.children.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn get(&self, key: &str) -> Option<&FormNode> {
        self.children.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    /// Group-level rule failures from the last refresh
    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    fn child(&self, segment: &PathSegment) -> Option<&FormNode> {
        match segment {
            PathSegment::Key(key) => self.get(key),
            PathSegment::Index(i) => self.get(&i.to_string()),
        }
    }

    fn child_mut(&mut self, segment: &PathSegment) -> Option<&mut FormNode> {
        let key = match segment {
            PathSegment::Key(key) => key.clone(),
            PathSegment::Index(i) => i.to_string(),
        };
        self.children
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, n)| n)
    }

    fn check_rules(&self) -> Vec<RuleFailure> {
        self.rules
            .iter()
            .filter(|rule| {
                !rule.check(|key| self.get(key).and_then(FormNode::as_field).map(FormField::value))
            })
            .map(|rule| RuleFailure::new(rule.id(), rule.message()))
            .collect()
    }
}

/// One boolean control per catalog entry, matched by index
#[derive(Debug, Clone)]
pub struct FormList {
    catalog: Vec<CatalogEntry>,
    controls: Vec<FormField>,
    rules: Vec<ListRule>,
    failures: Vec<RuleFailure>,
    touched: bool,
}

impl FormList {
    /// Caller guarantees `initial.len() == catalog.len()`
    pub(crate) fn new(catalog: Vec<CatalogEntry>, initial: Vec<bool>, rules: Vec<ListRule>) -> Self {
        let controls = initial
            .into_iter()
            .enumerate()
            .map(|(i, checked)| FormField::checkbox(&i.to_string(), checked))
            .collect();
        Self {
            catalog,
            controls,
            rules,
            failures: Vec::new(),
            touched: false,
        }
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn controls(&self) -> &[FormField] {
        &self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    /// Raw checkbox states, in catalog order
    pub fn values(&self) -> Vec<bool> {
        self.controls.iter().map(FormField::as_bool).collect()
    }

    pub fn selected_count(&self) -> usize {
        self.controls.iter().filter(|c| c.as_bool()).count()
    }

    /// Display names of the checked entries, in catalog order
    pub fn selected_names(&self) -> Vec<String> {
        self.catalog
            .iter()
            .zip(&self.controls)
            .filter(|(_, control)| control.as_bool())
            .map(|(entry, _)| entry.name.clone())
            .collect()
    }

    fn check_rules(&self) -> Vec<RuleFailure> {
        let selected = self.selected_count();
        self.rules
            .iter()
            .filter(|rule| !rule.check(selected))
            .map(|rule| RuleFailure::new(rule.id(), rule.message()))
            .collect()
    }
}

/// Value of the leaf field at `segments` below `node`
pub(crate) fn field_value<'a>(node: &'a FormNode, segments: &[PathSegment]) -> Option<&'a FieldValue> {
    node.resolve(segments)?.as_field().map(FormField::value)
}
