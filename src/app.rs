//! Session state and event handling

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{FormError, Result};
use crate::presets::Preset;
use crate::schema::FormSchema;
use crate::state::{FieldPath, FieldValue, FormTree, Snapshot, SubmitOutcome};
use crate::validation::ValidationReport;

/// A value addressed by path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValue {
    pub path: FieldPath,
    pub value: FieldValue,
}

/// Inbound events from a presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A field or list control changed
    Set { path: FieldPath, value: FieldValue },
    /// The user left a control
    Touch {
        path: FieldPath,
        #[serde(default)]
        recursive: bool,
    },
    Submit,
    /// Fields not named in `defaults` go back to their declared initial value
    Reset {
        #[serde(default)]
        defaults: Vec<PathValue>,
    },
    Patch { values: Vec<PathValue> },
}

/// What handling an event produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    Updated { valid: bool },
    Touched,
    Accepted { snapshot: Snapshot },
    Rejected { errors: ValidationReport },
    Reset { valid: bool },
    /// The event named an unknown path or carried the wrong value kind
    Failed { error: String },
}

/// Main session struct
pub struct App {
    /// The live form
    tree: FormTree,
    /// Whether the last submit was accepted
    submitted: bool,
    /// Feedback for the most recent event
    pub status_message: Option<String>,
}

impl App {
    pub fn new(tree: FormTree) -> Self {
        Self {
            tree,
            submitted: false,
            status_message: None,
        }
    }

    /// Create a session for one of the shipped forms
    pub fn from_preset(preset: Preset, config: &EngineConfig) -> Result<Self> {
        let schema = preset.schema(config)?;
        Self::from_schema(schema)
    }

    pub fn from_schema(schema: FormSchema) -> Result<Self> {
        Ok(Self::new(FormTree::new(schema)?))
    }

    pub fn tree(&self) -> &FormTree {
        &self.tree
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// The data of the last accepted submission
    pub fn submitted_data(&self) -> Option<&Snapshot> {
        self.tree.last_submission()
    }

    /// Handle an event, turning engine errors into a `Failed` outcome
    pub fn handle_event(&mut self, event: Event) -> EventOutcome {
        match self.apply(event) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("event failed: {err}");
                self.status_message = Some(err.to_string());
                EventOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Apply an event to the tree
    pub fn apply(&mut self, event: Event) -> Result<EventOutcome, FormError> {
        let outcome = match event {
            Event::Set { path, value } => EventOutcome::Updated {
                valid: self.tree.set_value(path, value)?,
            },
            Event::Patch { values } => EventOutcome::Updated {
                valid: self
                    .tree
                    .patch(values.into_iter().map(|pv| (pv.path, pv.value)))?,
            },
            Event::Touch { path, recursive } => {
                self.tree.mark_touched(path, recursive)?;
                EventOutcome::Touched
            }
            Event::Submit => self.submit(),
            Event::Reset { defaults } => {
                self.tree
                    .reset_with(defaults.into_iter().map(|pv| (pv.path, pv.value)))?;
                self.submitted = false;
                self.status_message = None;
                EventOutcome::Reset {
                    valid: self.tree.validate(),
                }
            }
        };
        Ok(outcome)
    }

    fn submit(&mut self) -> EventOutcome {
        match self.tree.submit() {
            SubmitOutcome::Accepted(snapshot) => {
                self.submitted = true;
                self.status_message = Some("Form submitted".to_string());
                EventOutcome::Accepted { snapshot }
            }
            SubmitOutcome::Rejected(errors) => {
                // Reveal feedback on every field
                self.tree.mark_all_touched();
                self.status_message = Some(format!(
                    "{} field(s) need attention",
                    errors.errors().len()
                ));
                EventOutcome::Rejected { errors }
            }
        }
    }
}
