//! The form tree engine

use std::fmt;

use super::field::{FieldValue, FormField};
use super::link::{LinkState, ReactiveLink};
use super::node::{field_value, FormGroup, FormList, FormNode, NodeRef};
use crate::clock::{Clock, LocalClock};
use crate::error::{FormError, Result, SchemaError};
use crate::schema::{FormSchema, GroupSchema, NodeSchema};
use crate::state::{FieldPath, PathSegment, Snapshot, SnapshotValue};
use crate::validation::{RuleContext, ValidationReport};

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(Snapshot),
    /// The tree was invalid; nothing was mutated
    Rejected(ValidationReport),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            SubmitOutcome::Accepted(snapshot) => Some(snapshot),
            SubmitOutcome::Rejected(_) => None,
        }
    }
}

/// A live tree of fields, groups and lists with reactive rule links.
///
/// Every mutating operation re-evaluates what it touched before returning, so
/// [`FormTree::validate`] is always a plain read.
pub struct FormTree {
    root: FormNode,
    links: Vec<LinkState>,
    clock: Box<dyn Clock>,
    last_submission: Option<Snapshot>,
}

impl fmt::Debug for FormTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormTree")
            .field("root", &self.root)
            .field("links", &self.links)
            .field("last_submission", &self.last_submission)
            .finish_non_exhaustive()
    }
}

impl FormTree {
    /// Build a tree whose date rules use the local calendar
    pub fn new(schema: FormSchema) -> Result<Self> {
        Self::with_clock(schema, LocalClock)
    }

    /// Build a tree with an explicit source of "today"
    pub fn with_clock(schema: FormSchema, clock: impl Clock + 'static) -> Result<Self> {
        let FormSchema {
            children,
            rules,
            links,
        } = schema;
        let root_schema = GroupSchema {
            key: String::new(),
            children,
            rules,
        };
        let root = build_group(&FieldPath::root(), root_schema)?;

        for link in &links {
            check_link(&root, link)?;
        }

        let mut tree = Self {
            root,
            links: links
                .into_iter()
                .map(|link| LinkState {
                    link,
                    applied: None,
                })
                .collect(),
            clock: Box::new(clock),
            last_submission: None,
        };
        let ctx = tree.context();
        tree.root.evaluate_all(&ctx);
        tracing::debug!(
            links = tree.links.len(),
            valid = tree.validate(),
            "form tree constructed"
        );
        Ok(tree)
    }

    fn context(&self) -> RuleContext {
        RuleContext {
            today: self.clock.today(),
        }
    }

    /// Store a value, re-evaluate the field, then fire every link sourced at
    /// `path` whose predicate flipped. Returns the aggregate validity.
    pub fn set_value(
        &mut self,
        path: impl Into<FieldPath>,
        value: impl Into<FieldValue>,
    ) -> Result<bool> {
        let path = path.into();
        let value = value.into();
        let ctx = self.context();

        let field = self.field_mut(&path)?;
        if field.kind() != value.kind() {
            return Err(FormError::ValueKindMismatch {
                expected: field.kind(),
                found: value.kind(),
                path,
            });
        }
        field.set_value(value);
        field.evaluate(&ctx);
        tracing::debug!(%path, valid = field.is_valid(), "field updated");

        self.fire_links(Some(&path), false, &[], &ctx);
        self.root.refresh_aggregates();
        Ok(self.validate())
    }

    /// Apply several values in order, stopping at the first error
    pub fn patch<I, P, V>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<FieldPath>,
        V: Into<FieldValue>,
    {
        for (path, value) in values {
            self.set_value(path, value)?;
        }
        Ok(self.validate())
    }

    /// Mark the node at `path` touched; with `recursive`, every descendant too
    pub fn mark_touched(&mut self, path: impl Into<FieldPath>, recursive: bool) -> Result<()> {
        let path = path.into();
        let node = self
            .root
            .resolve_mut(path.segments())
            .ok_or_else(|| FormError::PathNotFound(path.clone()))?;
        node.mark_touched(recursive);
        Ok(())
    }

    /// Mark the whole tree touched so every validation message becomes visible
    pub fn mark_all_touched(&mut self) {
        self.root.mark_touched(true);
    }

    /// Aggregate validity of the whole tree
    pub fn validate(&self) -> bool {
        self.root.is_valid()
    }

    /// Every invalid node with the rules it failed
    pub fn errors(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        self.root.collect_errors(&FieldPath::root(), &mut report);
        report
    }

    /// Snapshot the tree if it is valid; otherwise reject without mutating
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.validate() {
            let report = self.errors();
            tracing::warn!(invalid = report.errors().len(), "submission rejected");
            return SubmitOutcome::Rejected(report);
        }

        let snapshot = self.snapshot();
        tracing::info!("submission accepted");
        self.last_submission = Some(snapshot.clone());
        SubmitOutcome::Accepted(snapshot)
    }

    /// Restore declared initial values and clean flags, re-fire every link
    pub fn reset(&mut self) {
        self.restore(Vec::new());
    }

    /// Like [`FormTree::reset`], but named fields take the given values
    /// instead of their declared initial ones. Fails without mutating if
    /// any path or value kind is wrong.
    pub fn reset_with<I, P, V>(&mut self, defaults: I) -> Result<()>
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<FieldPath>,
        V: Into<FieldValue>,
    {
        let mut checked = Vec::new();
        for (path, value) in defaults {
            let path = path.into();
            let value = value.into();
            let field = self.field(&path)?;
            if field.kind() != value.kind() {
                return Err(FormError::ValueKindMismatch {
                    expected: field.kind(),
                    found: value.kind(),
                    path,
                });
            }
            checked.push((path, value));
        }
        self.restore(checked);
        Ok(())
    }

    fn restore(&mut self, defaults: Vec<(FieldPath, FieldValue)>) {
        let ctx = self.context();
        self.root
            .for_each_field_mut(&mut |field: &mut FormField| field.restore_initial());
        self.root.clear_touched();
        for (path, value) in &defaults {
            if let Ok(field) = self.field_mut(path) {
                field.load_value(value.clone());
            }
        }
        self.fire_links(None, true, &defaults, &ctx);
        self.root.evaluate_all(&ctx);
        self.last_submission = None;
        tracing::info!(valid = self.validate(), "form reset");
    }

    /// Fire links sourced at `source` (or all links when `None`). Without
    /// `force` a link only fires when its predicate's truth value changed.
    ///
    /// A link that clears its target on deactivation may change the source
    /// of another link, so firing repeats for links sourced inside cleared
    /// targets until nothing flips. `keep` holds values that clearing must
    /// not discard.
    fn fire_links(
        &mut self,
        source: Option<&FieldPath>,
        force: bool,
        keep: &[(FieldPath, FieldValue)],
        ctx: &RuleContext,
    ) {
        let mut cleared = self.fire_pass(
            |link| source.map_or(true, |s| *s == link.source),
            force,
            keep,
            ctx,
        );
        while !cleared.is_empty() {
            cleared = self.fire_pass(
                |link| cleared.iter().any(|target| link.source.starts_with(target)),
                false,
                keep,
                ctx,
            );
        }
    }

    /// One pass over the selected links; returns the targets that were cleared
    fn fire_pass(
        &mut self,
        select: impl Fn(&ReactiveLink) -> bool,
        force: bool,
        keep: &[(FieldPath, FieldValue)],
        ctx: &RuleContext,
    ) -> Vec<FieldPath> {
        let mut cleared = Vec::new();
        for state in &mut self.links {
            if !select(&state.link) {
                continue;
            }
            let Some(value) = field_value(&self.root, state.link.source.segments()) else {
                continue;
            };
            let active = state.link.predicate.test(value);
            if !force && state.applied == Some(active) {
                continue;
            }
            if apply_link(&mut self.root, &state.link, active, keep, ctx) {
                cleared.push(state.link.target.clone());
            }
            state.applied = Some(active);
            tracing::debug!(
                source = %state.link.source,
                target = %state.link.target,
                active,
                "reactive link fired"
            );
        }
        cleared
    }

    /// Build the submission projection without checking validity
    fn snapshot(&self) -> Snapshot {
        let inactive: Vec<&FieldPath> = self
            .links
            .iter()
            .filter(|state| {
                !field_value(&self.root, state.link.source.segments())
                    .is_some_and(|value| state.link.predicate.test(value))
            })
            .map(|state| &state.link.target)
            .collect();
        Snapshot::new(project(&self.root, &FieldPath::root(), &inactive))
    }

    fn field_mut(&mut self, path: &FieldPath) -> Result<&mut FormField> {
        self.root
            .resolve_mut(path.segments())
            .and_then(|node| node.into_field())
            .ok_or_else(|| FormError::PathNotFound(path.clone()))
    }

    /// Whatever `path` addresses: a node or a list control
    pub fn node(&self, path: impl Into<FieldPath>) -> Result<NodeRef<'_>> {
        let path = path.into();
        self.root
            .resolve(path.segments())
            .ok_or(FormError::PathNotFound(path))
    }

    /// The leaf field at `path`
    pub fn field(&self, path: impl Into<FieldPath>) -> Result<&FormField> {
        let path = path.into();
        self.root
            .resolve(path.segments())
            .and_then(NodeRef::as_field)
            .ok_or(FormError::PathNotFound(path))
    }

    pub fn value(&self, path: impl Into<FieldPath>) -> Result<&FieldValue> {
        self.field(path).map(FormField::value)
    }

    /// Number of checked controls in the list at `path`
    pub fn selected_count(&self, path: impl Into<FieldPath>) -> Result<usize> {
        let path = path.into();
        self.root
            .resolve(path.segments())
            .and_then(NodeRef::as_list)
            .map(FormList::selected_count)
            .ok_or(FormError::PathNotFound(path))
    }

    /// Character count of the text field at `path`
    pub fn char_count(&self, path: impl Into<FieldPath>) -> Result<usize> {
        self.field(path).map(|f| f.as_text().chars().count())
    }

    /// True if any field was changed by the user since construction or reset
    pub fn is_dirty(&self) -> bool {
        self.root.is_dirty()
    }

    pub fn root(&self) -> &FormNode {
        &self.root
    }

    pub fn links(&self) -> impl Iterator<Item = &ReactiveLink> {
        self.links.iter().map(|state| &state.link)
    }

    /// The snapshot of the last accepted submission, until the next reset
    pub fn last_submission(&self) -> Option<&Snapshot> {
        self.last_submission.as_ref()
    }
}

fn build_node(parent: &FieldPath, schema: NodeSchema) -> Result<FormNode, SchemaError> {
    match schema {
        NodeSchema::Field(f) => Ok(FormNode::Field(FormField::new(&f.key, f.initial, f.rules))),
        NodeSchema::Group(g) => {
            let path = parent.key(g.key.as_str());
            build_group(&path, g)
        }
        NodeSchema::List(l) => {
            let initial = l.initial.unwrap_or_else(|| vec![false; l.catalog.len()]);
            if initial.len() != l.catalog.len() {
                return Err(SchemaError::CatalogMismatch {
                    path: parent.key(l.key.as_str()),
                    controls: initial.len(),
                    catalog: l.catalog.len(),
                });
            }
            Ok(FormNode::List(FormList::new(l.catalog, initial, l.rules)))
        }
    }
}

fn build_group(path: &FieldPath, schema: GroupSchema) -> Result<FormNode, SchemaError> {
    let mut children: Vec<(String, FormNode)> = Vec::with_capacity(schema.children.len());
    for child in schema.children {
        let key = child.key().to_string();
        if !is_addressable(&key) {
            return Err(SchemaError::InvalidKey {
                group: path.clone(),
                key,
            });
        }
        if children.iter().any(|(k, _)| *k == key) {
            return Err(SchemaError::DuplicateKey {
                group: path.clone(),
                key,
            });
        }
        let node = build_node(path, child)?;
        children.push((key, node));
    }
    for rule in &schema.rules {
        for key in rule.keys() {
            let is_field = children
                .iter()
                .any(|(k, node)| k == key && node.as_field().is_some());
            if !is_field {
                return Err(SchemaError::GroupRuleKey {
                    group: path.clone(),
                    key: key.to_string(),
                });
            }
        }
    }
    Ok(FormNode::Group(FormGroup::new(children, schema.rules)))
}

/// A key must parse back to a single path segment that names it
fn is_addressable(key: &str) -> bool {
    match FieldPath::parse(key).segments() {
        [PathSegment::Key(k)] => k == key,
        [PathSegment::Index(i)] => i.to_string() == key,
        _ => false,
    }
}

fn check_link(root: &FormNode, link: &ReactiveLink) -> Result<(), SchemaError> {
    root.resolve(link.source.segments())
        .and_then(NodeRef::as_field)
        .ok_or_else(|| SchemaError::LinkSource(link.source.clone()))?;
    root.resolve(link.target.segments())
        .ok_or_else(|| SchemaError::LinkTarget(link.target.clone()))?;
    for relative in link.governed_paths() {
        let full = link.target.join(relative);
        if root.resolve(full.segments()).and_then(NodeRef::as_field).is_none() {
            return Err(SchemaError::LinkRulePath(full));
        }
    }
    Ok(())
}

/// Swap the rule set of every governed field, then reset feedback and
/// re-evaluate the whole target subtree. Returns true if the target's values
/// were restored to their initial ones, except those named in `keep`.
fn apply_link(
    root: &mut FormNode,
    link: &ReactiveLink,
    active: bool,
    keep: &[(FieldPath, FieldValue)],
    ctx: &RuleContext,
) -> bool {
    for relative in link.governed_paths() {
        let full = link.target.join(relative);
        if let Some(field) = root
            .resolve_mut(full.segments())
            .and_then(|node| node.into_field())
        {
            field.set_rules(link.rules_for(relative, active));
        }
    }

    let clear_values = !active && link.clear_on_deactivate;
    if let Some(target) = root.resolve_mut(link.target.segments()) {
        target.for_each_field_mut(&mut |field: &mut FormField| {
            if clear_values {
                field.restore_initial();
            }
            field.clear_feedback();
        });
    }
    if clear_values {
        for (path, value) in keep.iter().filter(|(p, _)| p.starts_with(&link.target)) {
            if let Some(field) = root
                .resolve_mut(path.segments())
                .and_then(|node| node.into_field())
            {
                field.load_value(value.clone());
            }
        }
    }
    if let Some(target) = root.resolve_mut(link.target.segments()) {
        target.for_each_field_mut(&mut |field: &mut FormField| {
            field.evaluate(ctx);
        });
    }
    clear_values
}

fn project(node: &FormNode, path: &FieldPath, inactive: &[&FieldPath]) -> SnapshotValue {
    if !path.is_root() && inactive.contains(&path) {
        return SnapshotValue::Null;
    }
    match node {
        FormNode::Field(f) => SnapshotValue::from(f.value()),
        FormNode::Group(g) => SnapshotValue::Map(
            g.children()
                .map(|(key, child)| (key.to_string(), project(child, &path.key(key), inactive)))
                .collect(),
        ),
        FormNode::List(l) => SnapshotValue::Selected(l.selected_names()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, StaticCatalog};
    use crate::clock::{FixedClock, MockClock};
    use crate::schema::{FieldSchema, ListSchema};
    use crate::state::forms::{Predicate, ValidityState};
    use crate::validation::{GroupRule, ListRule, Rule};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::from_names(&[
            "Frontend Development",
            "Backend Development",
            "UI/UX",
            "Data Science",
            "Flutter",
        ])
    }

    fn emergency_link() -> ReactiveLink {
        ReactiveLink::new("hasEmergencyContact", Predicate::IsTrue, "emergencyContact")
            .when_active("contactName", vec![Rule::Required])
            .when_active("relationship", vec![Rule::Required])
            .when_active(
                "contactPhone",
                vec![Rule::Required, Rule::pattern(r"^\d+$").unwrap()],
            )
    }

    /// Only the linked subtree carries rules, so the tree starts valid
    fn contact_schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSchema::text("fullName", "Ama Mensah"))
            .field(FieldSchema::checkbox("hasEmergencyContact", false))
            .group(
                GroupSchema::new("emergencyContact")
                    .field(FieldSchema::text("contactName", ""))
                    .field(FieldSchema::text("relationship", ""))
                    .field(FieldSchema::text("contactPhone", "")),
            )
            .link(emergency_link())
    }

    fn contact_tree() -> FormTree {
        FormTree::with_clock(contact_schema(), FixedClock(today())).unwrap()
    }

    fn required_schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSchema::text("city", "").rule(Rule::Required))
            .field(
                FieldSchema::text("dateOfBirth", "")
                    .rules([Rule::NotFutureDate, Rule::minimum_age(10)]),
            )
            .list(ListSchema::new("courses", &catalog()).rule(ListRule::AtLeastOneSelected))
    }

    fn required_tree() -> FormTree {
        FormTree::with_clock(required_schema(), FixedClock(today())).unwrap()
    }

    mod construct {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_initial_validity_reflects_rules() {
            assert!(!required_tree().validate());
            assert!(contact_tree().validate());
        }

        #[test]
        fn test_fields_evaluated_at_construction() {
            let tree = required_tree();
            let city = tree.field("city").unwrap();
            assert_eq!(city.status(), ValidityState::Invalid);
            assert!(!city.is_dirty());
            assert!(!city.is_touched());
        }

        #[test]
        fn test_links_registered_but_not_fired() {
            let tree = contact_tree();
            assert_eq!(tree.links().count(), 1);
            assert!(tree.field("emergencyContact.contactName").unwrap().rules().is_empty());
        }

        #[test]
        fn test_list_length_matches_catalog() {
            let tree = required_tree();
            let list = tree.node("courses").unwrap().as_list().unwrap();
            assert_eq!(list.len(), 5);
        }

        #[test]
        fn test_duplicate_key_is_schema_error() {
            let schema = FormSchema::new()
                .group(
                    GroupSchema::new("address")
                        .field(FieldSchema::text("city", ""))
                        .field(FieldSchema::text("city", "")),
                );
            let err = FormTree::new(schema).unwrap_err();
            assert_eq!(
                err,
                FormError::Schema(SchemaError::DuplicateKey {
                    group: FieldPath::parse("address"),
                    key: "city".to_string(),
                })
            );
        }

        #[test]
        fn test_catalog_mismatch_is_schema_error() {
            let schema = FormSchema::new()
                .list(ListSchema::new("courses", &catalog()).initial(vec![true, false]));
            let err = FormTree::new(schema).unwrap_err();
            assert!(matches!(
                err,
                FormError::Schema(SchemaError::CatalogMismatch {
                    controls: 2,
                    catalog: 5,
                    ..
                })
            ));
        }

        #[test]
        fn test_link_source_must_be_a_field() {
            let schema = contact_schema().link(ReactiveLink::new(
                "emergencyContact",
                Predicate::Filled,
                "fullName",
            ));
            let err = FormTree::new(schema).unwrap_err();
            assert!(matches!(err, FormError::Schema(SchemaError::LinkSource(_))));
        }

        #[test]
        fn test_link_target_must_exist() {
            let schema = contact_schema().link(ReactiveLink::new(
                "hasEmergencyContact",
                Predicate::IsTrue,
                "guardian",
            ));
            let err = FormTree::new(schema).unwrap_err();
            assert!(matches!(err, FormError::Schema(SchemaError::LinkTarget(_))));
        }

        #[test]
        fn test_link_rule_path_must_name_a_field() {
            let schema = contact_schema().link(
                ReactiveLink::new("hasEmergencyContact", Predicate::IsTrue, "emergencyContact")
                    .when_active("email", vec![Rule::Required]),
            );
            let err = FormTree::new(schema).unwrap_err();
            assert_eq!(
                err,
                FormError::Schema(SchemaError::LinkRulePath(FieldPath::parse(
                    "emergencyContact.email"
                )))
            );
        }

        #[test]
        fn test_mock_clock_drives_date_rules() {
            let mut clock = MockClock::new();
            clock.expect_today().return_const(today());
            let schema = FormSchema::new()
                .field(FieldSchema::text("dateOfBirth", "2026-10-19").rule(Rule::NotFutureDate));
            let tree = FormTree::with_clock(schema, clock).unwrap();
            assert!(!tree.validate());
        }

        fn account(rule: GroupRule) -> FormSchema {
            FormSchema::new().group(
                GroupSchema::new("account")
                    .field(FieldSchema::text("password", ""))
                    .field(FieldSchema::text("confirm", ""))
                    .group(GroupSchema::new("recovery").field(FieldSchema::text("email", "")))
                    .rule(rule),
            )
        }

        #[test]
        fn test_group_rule_key_must_exist() {
            let err = FormTree::new(account(GroupRule::FieldsMatch {
                first: "password".to_string(),
                second: "confrim".to_string(),
            }))
            .unwrap_err();
            assert_eq!(
                err,
                FormError::Schema(SchemaError::GroupRuleKey {
                    group: FieldPath::parse("account"),
                    key: "confrim".to_string(),
                })
            );
        }

        #[test]
        fn test_group_rule_key_must_name_a_field() {
            let err = FormTree::new(account(GroupRule::AnyFilled {
                keys: vec!["password".to_string(), "recovery".to_string()],
            }))
            .unwrap_err();
            assert_eq!(
                err,
                FormError::Schema(SchemaError::GroupRuleKey {
                    group: FieldPath::parse("account"),
                    key: "recovery".to_string(),
                })
            );
        }

        #[test]
        fn test_unaddressable_keys_are_rejected() {
            for key in ["01", "a.b", "x[1]", ""] {
                let schema = FormSchema::new().field(FieldSchema::text(key, ""));
                let err = FormTree::new(schema).unwrap_err();
                assert_eq!(
                    err,
                    FormError::Schema(SchemaError::InvalidKey {
                        group: FieldPath::root(),
                        key: key.to_string(),
                    }),
                    "key {key:?}"
                );
            }

            let nested = FormSchema::new()
                .group(GroupSchema::new("address").field(FieldSchema::text("line.1", "")));
            assert!(matches!(
                FormTree::new(nested),
                Err(FormError::Schema(SchemaError::InvalidKey { .. }))
            ));
        }

        #[test]
        fn test_numeric_key_is_addressable() {
            let schema = FormSchema::new().field(FieldSchema::text("0", "first"));
            let mut tree = FormTree::with_clock(schema, FixedClock(today())).unwrap();
            assert_eq!(tree.value("0").unwrap(), &FieldValue::from("first"));
            tree.set_value("0", "second").unwrap();
            assert_eq!(tree.value("[0]").unwrap(), &FieldValue::from("second"));
        }
    }

    mod set_value {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_updates_value_dirty_and_validity() {
            let mut tree = required_tree();
            tree.set_value("city", "Accra").unwrap();
            let city = tree.field("city").unwrap();
            assert_eq!(city.as_text(), "Accra");
            assert!(city.is_dirty());
            assert!(city.is_valid());
        }

        #[test]
        fn test_returns_whole_tree_validity() {
            let mut tree = required_tree();
            assert!(!tree.set_value("city", "Accra").unwrap());
            assert!(tree.set_value("courses.2", true).unwrap());
        }

        #[test]
        fn test_unknown_path_fails_fast() {
            let mut tree = required_tree();
            let err = tree.set_value("address.city", "Accra").unwrap_err();
            assert_eq!(err, FormError::PathNotFound(FieldPath::parse("address.city")));
            let err = tree.set_value("courses.5", true).unwrap_err();
            assert_eq!(err, FormError::PathNotFound(FieldPath::parse("courses.5")));
        }

        #[test]
        fn test_group_path_is_not_a_field() {
            let mut tree = contact_tree();
            assert!(matches!(
                tree.set_value("emergencyContact", "x"),
                Err(FormError::PathNotFound(_))
            ));
        }

        #[test]
        fn test_wrong_kind_leaves_field_untouched() {
            let mut tree = contact_tree();
            let err = tree.set_value("hasEmergencyContact", "yes").unwrap_err();
            assert!(matches!(err, FormError::ValueKindMismatch { .. }));
            let field = tree.field("hasEmergencyContact").unwrap();
            assert!(!field.as_bool());
            assert!(!field.is_dirty());
        }

        #[test]
        fn test_date_rules_against_clock() {
            let mut tree = required_tree();
            tree.set_value("dateOfBirth", "2026-10-19").unwrap();
            assert_eq!(
                tree.errors().failed_rules(&FieldPath::parse("dateOfBirth")),
                vec!["not_future_date", "minimum_age"]
            );
            tree.set_value("dateOfBirth", "2016-10-18").unwrap();
            assert!(tree.field("dateOfBirth").unwrap().is_valid());
            tree.set_value("dateOfBirth", "2016-10-28").unwrap();
            assert_eq!(
                tree.errors().failed_rules(&FieldPath::parse("dateOfBirth")),
                vec!["minimum_age"]
            );
        }

        #[test]
        fn test_group_rules_follow_children() {
            let schema = FormSchema::new().group(
                GroupSchema::new("account")
                    .field(FieldSchema::text("password", ""))
                    .field(FieldSchema::text("confirm", ""))
                    .rule(GroupRule::FieldsMatch {
                        first: "password".to_string(),
                        second: "confirm".to_string(),
                    }),
            );
            let mut tree = FormTree::with_clock(schema, FixedClock(today())).unwrap();
            assert!(tree.validate());
            assert!(!tree.set_value("account.password", "hunter2").unwrap());
            assert_eq!(
                tree.errors().failed_rules(&FieldPath::parse("account")),
                vec!["fields_match"]
            );
            assert!(tree.set_value("account.confirm", "hunter2").unwrap());
        }

        #[test]
        fn test_patch_applies_in_order() {
            let mut tree = required_tree();
            let valid = tree
                .patch([("city", FieldValue::from("Tema")), ("courses.0", true.into())])
                .unwrap();
            assert!(valid);
            assert_eq!(tree.selected_count("courses").unwrap(), 1);
        }

        #[test]
        fn test_patch_stops_at_first_bad_path() {
            let mut tree = required_tree();
            let result = tree.patch([("city", "Tema"), ("region", "Volta")]);
            assert!(result.is_err());
            assert_eq!(tree.value("city").unwrap(), &FieldValue::from("Tema"));
        }
    }

    mod reactive_links {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_activating_attaches_rules() {
            let mut tree = contact_tree();
            assert!(!tree.set_value("hasEmergencyContact", true).unwrap());
            let report = tree.errors();
            assert_eq!(
                report.failed_rules(&FieldPath::parse("emergencyContact.contactName")),
                vec!["required"]
            );
            assert_eq!(
                report.failed_rules(&FieldPath::parse("emergencyContact.contactPhone")),
                vec!["required"]
            );
        }

        #[test]
        fn test_deactivating_detaches_rules_and_keeps_values() {
            let mut tree = contact_tree();
            tree.set_value("hasEmergencyContact", true).unwrap();
            tree.set_value("emergencyContact.contactPhone", "not-digits")
                .unwrap();
            assert!(!tree.validate());

            assert!(tree.set_value("hasEmergencyContact", false).unwrap());
            let phone = tree.field("emergencyContact.contactPhone").unwrap();
            assert_eq!(phone.as_text(), "not-digits");
            assert!(phone.rules().is_empty());
            assert!(phone.is_valid());
        }

        #[test]
        fn test_filled_target_is_valid_while_active() {
            let mut tree = contact_tree();
            tree.set_value("hasEmergencyContact", true).unwrap();
            tree.patch([
                ("emergencyContact.contactName", "Kofi Mensah"),
                ("emergencyContact.relationship", "Brother"),
                ("emergencyContact.contactPhone", "0244123456"),
            ])
            .unwrap();
            assert!(tree.validate());
        }

        #[test]
        fn test_activation_resets_touched_feedback() {
            let mut tree = contact_tree();
            tree.mark_all_touched();
            tree.set_value("hasEmergencyContact", true).unwrap();
            assert!(!tree
                .node("emergencyContact.contactName")
                .unwrap()
                .is_touched());
        }

        #[test]
        fn test_unchanged_truth_value_does_not_refire() {
            let mut tree = contact_tree();
            tree.set_value("hasEmergencyContact", true).unwrap();
            tree.mark_touched("emergencyContact", true).unwrap();
            tree.set_value("hasEmergencyContact", true).unwrap();
            assert!(tree
                .node("emergencyContact.contactName")
                .unwrap()
                .is_touched());
        }

        #[test]
        fn test_clear_on_deactivate_restores_initial_values() {
            let mut schema = contact_schema();
            schema.links = vec![emergency_link().clear_on_deactivate(true)];
            let mut tree = FormTree::with_clock(schema, FixedClock(today())).unwrap();
            tree.set_value("hasEmergencyContact", true).unwrap();
            tree.set_value("emergencyContact.contactName", "Kofi").unwrap();
            tree.set_value("hasEmergencyContact", false).unwrap();
            let name = tree.field("emergencyContact.contactName").unwrap();
            assert_eq!(name.as_text(), "");
            assert!(!name.is_dirty());
        }

        #[test]
        fn test_inactive_rule_set_is_attached_when_false() {
            let schema = FormSchema::new()
                .field(FieldSchema::text("gender", ""))
                .field(FieldSchema::text("genderOther", ""))
                .link(
                    ReactiveLink::new(
                        "gender",
                        Predicate::Equals {
                            value: "other".into(),
                        },
                        "genderOther",
                    )
                    .when_active("", vec![Rule::Required])
                    .when_inactive("", vec![Rule::max_length(0)]),
                );
            let mut tree = FormTree::with_clock(schema, FixedClock(today())).unwrap();
            tree.set_value("gender", "female").unwrap();
            assert!(!tree.set_value("genderOther", "x").unwrap());
            assert!(tree.set_value("gender", "other").unwrap());
            assert_eq!(tree.field("genderOther").unwrap().rules(), &[Rule::Required]);
            assert!(!tree.set_value("genderOther", "").unwrap());
        }

        /// `guardian` sits inside `minor`; clearing `minor` unchecks it
        fn chained_tree() -> FormTree {
            let schema = FormSchema::new()
                .field(FieldSchema::checkbox("isMinor", false))
                .group(GroupSchema::new("minor").field(FieldSchema::checkbox("hasGuardian", false)))
                .group(GroupSchema::new("guardian").field(FieldSchema::text("name", "")))
                .link(
                    ReactiveLink::new("isMinor", Predicate::IsTrue, "minor")
                        .clear_on_deactivate(true),
                )
                .link(
                    ReactiveLink::new("minor.hasGuardian", Predicate::IsTrue, "guardian")
                        .when_active("name", vec![Rule::Required]),
                );
            FormTree::with_clock(schema, FixedClock(today())).unwrap()
        }

        #[test]
        fn test_clearing_a_source_refires_its_link() {
            let mut tree = chained_tree();
            tree.set_value("isMinor", true).unwrap();
            assert!(!tree.set_value("minor.hasGuardian", true).unwrap());

            assert!(tree.set_value("isMinor", false).unwrap());
            assert!(!tree.field("minor.hasGuardian").unwrap().as_bool());
            assert!(tree.field("guardian.name").unwrap().rules().is_empty());
            assert!(tree.validate());

            let snapshot = tree.submit().snapshot().cloned().unwrap();
            assert!(snapshot.get("minor").unwrap().is_null());
            assert!(snapshot.get("guardian").unwrap().is_null());
        }

        #[test]
        fn test_reactivating_after_chained_clear() {
            let mut tree = chained_tree();
            tree.set_value("isMinor", true).unwrap();
            tree.set_value("minor.hasGuardian", true).unwrap();
            tree.set_value("isMinor", false).unwrap();
            tree.set_value("isMinor", true).unwrap();
            assert!(tree.validate());
            assert!(!tree.set_value("minor.hasGuardian", true).unwrap());
            assert_eq!(
                tree.field("guardian.name").unwrap().rules(),
                &[Rule::Required]
            );
        }
    }

    mod touched {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_shallow_touch() {
            let mut tree = contact_tree();
            tree.mark_touched("emergencyContact", false).unwrap();
            assert!(tree.node("emergencyContact").unwrap().is_touched());
            assert!(!tree
                .node("emergencyContact.contactName")
                .unwrap()
                .is_touched());
        }

        #[test]
        fn test_recursive_touch_reaches_list_controls() {
            let mut tree = required_tree();
            tree.mark_touched("", true).unwrap();
            assert!(tree.node("courses.4").unwrap().is_touched());
            assert!(tree.node("city").unwrap().is_touched());
        }

        #[test]
        fn test_touch_single_control() {
            let mut tree = required_tree();
            tree.mark_touched("courses.1", false).unwrap();
            assert!(tree.node("courses.1").unwrap().is_touched());
            assert!(!tree.node("courses.0").unwrap().is_touched());
        }

        #[test]
        fn test_touch_unknown_path() {
            let mut tree = required_tree();
            assert_eq!(
                tree.mark_touched("nowhere", true),
                Err(FormError::PathNotFound(FieldPath::parse("nowhere")))
            );
        }
    }

    mod validate {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_validate_is_idempotent() {
            let mut tree = required_tree();
            tree.set_value("city", "Ho").unwrap();
            let first = tree.validate();
            for _ in 0..5 {
                assert_eq!(tree.validate(), first);
            }
            assert_eq!(tree.errors(), tree.errors());
        }

        #[test]
        fn test_list_rule_reported_at_list_path() {
            let tree = required_tree();
            assert_eq!(
                tree.errors().failed_rules(&FieldPath::parse("courses")),
                vec!["at_least_one_selected"]
            );
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_rejected_leaves_tree_unchanged() {
            let mut tree = required_tree();
            tree.set_value("city", "Cape Coast").unwrap();
            let outcome = tree.submit();
            match outcome {
                SubmitOutcome::Rejected(report) => {
                    assert_eq!(report.first_invalid(), Some(&FieldPath::parse("courses")));
                }
                SubmitOutcome::Accepted(_) => panic!("invalid tree was accepted"),
            }
            assert_eq!(tree.value("city").unwrap(), &FieldValue::from("Cape Coast"));
            assert!(tree.last_submission().is_none());
            assert!(!tree.node("city").unwrap().is_touched());
        }

        #[test]
        fn test_selected_list_projects_catalog_names() {
            let schema = FormSchema::new().list(
                ListSchema::new("courses", &catalog()).initial(vec![true, false, true, false, false]),
            );
            let mut tree = FormTree::with_clock(schema, FixedClock(today())).unwrap();
            let outcome = tree.submit();
            let snapshot = outcome.snapshot().unwrap();
            assert_eq!(
                snapshot.get("courses").and_then(SnapshotValue::as_selected),
                Some(
                    &[
                        "Frontend Development".to_string(),
                        "UI/UX".to_string()
                    ][..]
                )
            );
        }

        #[test]
        fn test_inactive_subtree_projects_to_null() {
            let mut tree = contact_tree();
            tree.set_value("hasEmergencyContact", true).unwrap();
            tree.set_value("emergencyContact.contactName", "Kofi").unwrap();
            tree.set_value("hasEmergencyContact", false).unwrap();

            let snapshot = tree.submit().snapshot().cloned().unwrap();
            assert!(snapshot.get("emergencyContact").unwrap().is_null());
            assert_eq!(
                snapshot.to_json(),
                serde_json::json!({
                    "fullName": "Ama Mensah",
                    "hasEmergencyContact": false,
                    "emergencyContact": null
                })
            );
        }

        #[test]
        fn test_active_subtree_is_projected() {
            let mut tree = contact_tree();
            tree.set_value("hasEmergencyContact", true).unwrap();
            tree.patch([
                ("emergencyContact.contactName", "Kofi Mensah"),
                ("emergencyContact.relationship", "Brother"),
                ("emergencyContact.contactPhone", "0244123456"),
            ])
            .unwrap();
            let snapshot = tree.submit().snapshot().cloned().unwrap();
            assert_eq!(
                snapshot.get("emergencyContact.relationship").and_then(SnapshotValue::as_text),
                Some("Brother")
            );
            assert_eq!(tree.last_submission(), Some(&snapshot));
        }
    }

    mod reset {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_reset_restores_initial_values_and_flags() {
            let mut tree = required_tree();
            tree.set_value("city", "Accra").unwrap();
            tree.set_value("courses.3", true).unwrap();
            tree.mark_all_touched();

            tree.reset();
            assert_eq!(tree.value("city").unwrap(), &FieldValue::from(""));
            assert_eq!(tree.selected_count("courses").unwrap(), 0);
            assert!(!tree.is_dirty());
            assert!(!tree.node("").unwrap().is_touched());
            assert!(!tree.node("courses.3").unwrap().is_touched());
        }

        #[test]
        fn test_reset_redetaches_conditional_rules() {
            let mut tree = contact_tree();
            tree.set_value("hasEmergencyContact", true).unwrap();
            assert!(!tree.validate());

            tree.reset();
            assert!(tree.validate());
            assert!(tree.field("emergencyContact.contactName").unwrap().rules().is_empty());
        }

        #[test]
        fn test_reset_with_defaults_fires_links() {
            let mut tree = contact_tree();
            tree.reset_with([("hasEmergencyContact", true)]).unwrap();
            assert!(!tree.validate());
            assert!(!tree.field("hasEmergencyContact").unwrap().is_dirty());
            assert_eq!(
                tree.field("emergencyContact.contactName").unwrap().rules(),
                &[Rule::Required]
            );
        }

        #[test]
        fn test_reset_with_bad_path_mutates_nothing() {
            let mut tree = contact_tree();
            tree.set_value("fullName", "Yaw").unwrap();
            let err = tree
                .reset_with([("fullName", FieldValue::from("")), ("nickname", "Y".into())])
                .unwrap_err();
            assert!(matches!(err, FormError::PathNotFound(_)));
            assert_eq!(tree.value("fullName").unwrap(), &FieldValue::from("Yaw"));
        }

        #[test]
        fn test_reset_clears_last_submission() {
            let mut tree = contact_tree();
            assert!(tree.submit().is_accepted());
            assert!(tree.last_submission().is_some());
            tree.reset();
            assert!(tree.last_submission().is_none());
        }

        #[test]
        fn test_reset_with_defaults_survive_clearing_link() {
            let mut schema = contact_schema();
            schema.links = vec![emergency_link().clear_on_deactivate(true)];
            let mut tree = FormTree::with_clock(schema, FixedClock(today())).unwrap();
            tree.set_value("hasEmergencyContact", true).unwrap();
            tree.set_value("emergencyContact.relationship", "Aunt").unwrap();

            tree.reset_with([("emergencyContact.contactName", "Kofi")])
                .unwrap();
            assert_eq!(
                tree.value("emergencyContact.contactName").unwrap(),
                &FieldValue::from("Kofi")
            );
            assert_eq!(
                tree.value("emergencyContact.relationship").unwrap(),
                &FieldValue::from("")
            );
            assert!(!tree.is_dirty());
            assert!(tree.validate());
        }
    }

    mod queries {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_char_count() {
            let tree = contact_tree();
            assert_eq!(tree.char_count("fullName").unwrap(), 10);
        }

        #[test]
        fn test_selected_count_on_non_list() {
            let tree = contact_tree();
            assert!(tree.selected_count("fullName").is_err());
        }

        #[test]
        fn test_list_catalog_is_read_only_view() {
            let tree = required_tree();
            let list = tree.node("courses").unwrap().as_list().unwrap();
            assert_eq!(list.catalog()[4], CatalogEntry::new(5, "Flutter"));
        }
    }
}
