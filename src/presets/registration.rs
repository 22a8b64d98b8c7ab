//! Flat registration form

use crate::config::EngineConfig;
use crate::error::SchemaError;
use crate::schema::{FieldSchema, FormSchema};
use crate::validation::Rule;

pub const FULL_NAME: &str = "fullName";
pub const EMAIL: &str = "email";
pub const PHONE_NUMBER: &str = "phoneNumber";
pub const GENDER: &str = "gender";
pub const DATE_OF_BIRTH: &str = "dateOfBirth";
pub const PROGRAM_OF_STUDY: &str = "programOfStudy";

/// Every field is required; the date of birth must not be in the future and
/// must meet the configured minimum age.
pub fn schema(config: &EngineConfig) -> Result<FormSchema, SchemaError> {
    Ok(FormSchema::new()
        .field(FieldSchema::text(FULL_NAME, "").rule(Rule::Required))
        .field(FieldSchema::text(EMAIL, "").rules([Rule::Required, Rule::Email]))
        .field(FieldSchema::text(PHONE_NUMBER, "").rule(Rule::Required))
        .field(FieldSchema::text(GENDER, "").rule(Rule::Required))
        .field(FieldSchema::text(DATE_OF_BIRTH, "").rules([
            Rule::Required,
            Rule::NotFutureDate,
            Rule::minimum_age(config.min_age_years()),
        ]))
        .field(FieldSchema::text(PROGRAM_OF_STUDY, "").rule(Rule::Required)))
}
