//! Ready-made forms built on the engine

pub mod reactive_demo;
pub mod registration;
pub mod student_registration;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::SchemaError;
use crate::schema::FormSchema;

pub use student_registration::CourseCatalog;

/// The shipped forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Flat registration form with date-of-birth rules
    Registration,
    /// Four-field demo form
    Demo,
    /// Nested student registration with courses and an emergency contact
    Student,
}

impl Preset {
    pub fn schema(self, config: &EngineConfig) -> Result<FormSchema, SchemaError> {
        match self {
            Preset::Registration => registration::schema(config),
            Preset::Demo => reactive_demo::schema(config),
            Preset::Student => student_registration::schema(&CourseCatalog, config),
        }
    }
}
