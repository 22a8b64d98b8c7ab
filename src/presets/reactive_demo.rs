//! Small demo form with a phone-number pattern

use crate::config::EngineConfig;
use crate::error::SchemaError;
use crate::schema::{FieldSchema, FormSchema};
use crate::validation::Rule;

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const EMAIL: &str = "email";
pub const PHONE_NUMBER: &str = "phoneNumber";

/// The phone number is optional but must match the configured pattern
pub fn schema(config: &EngineConfig) -> Result<FormSchema, SchemaError> {
    Ok(FormSchema::new()
        .field(FieldSchema::text(FIRST_NAME, "").rule(Rule::Required))
        .field(FieldSchema::text(LAST_NAME, "").rule(Rule::Required))
        .field(FieldSchema::text(EMAIL, "").rules([Rule::Required, Rule::Email]))
        .field(
            FieldSchema::text(PHONE_NUMBER, "").rule(Rule::pattern(config.demo_phone_pattern())?),
        ))
}
