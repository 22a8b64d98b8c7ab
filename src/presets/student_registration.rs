//! Nested student registration form
//!
//! Layout:
//!
//! ```text
//! personal             fullName, email, phone, gender, dateOfBirth
//! address              city, region, digitalAddress
//! courses              one checkbox per catalog entry
//! hasEmergencyContact  checkbox
//! emergencyContact     contactName, relationship, contactPhone
//! ```
//!
//! The emergency contact fields are only validated (and only submitted)
//! while `hasEmergencyContact` is checked.

use crate::catalog::{CatalogEntry, CatalogProvider};
use crate::config::EngineConfig;
use crate::error::{Result, SchemaError};
use crate::schema::{FieldSchema, FormSchema, GroupSchema, ListSchema};
use crate::state::{FormTree, Predicate, ReactiveLink};
use crate::validation::{ListRule, Rule};

pub const PERSONAL: &str = "personal";
pub const FULL_NAME: &str = "personal.fullName";
pub const EMAIL: &str = "personal.email";
pub const PHONE: &str = "personal.phone";
pub const GENDER: &str = "personal.gender";
pub const DATE_OF_BIRTH: &str = "personal.dateOfBirth";
pub const ADDRESS: &str = "address";
pub const CITY: &str = "address.city";
pub const REGION: &str = "address.region";
pub const DIGITAL_ADDRESS: &str = "address.digitalAddress";
pub const COURSES: &str = "courses";
pub const HAS_EMERGENCY_CONTACT: &str = "hasEmergencyContact";
pub const EMERGENCY_CONTACT: &str = "emergencyContact";
pub const CONTACT_NAME: &str = "emergencyContact.contactName";
pub const RELATIONSHIP: &str = "emergencyContact.relationship";
pub const CONTACT_PHONE: &str = "emergencyContact.contactPhone";

const COURSES_OFFERED: [&str; 5] = [
    "Frontend Development",
    "Backend Development",
    "UI/UX",
    "Data Science",
    "Flutter",
];

/// The courses offered, ids from 1
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseCatalog;

impl CatalogProvider for CourseCatalog {
    fn entries(&self) -> Vec<CatalogEntry> {
        COURSES_OFFERED
            .iter()
            .zip(1..)
            .map(|(name, id)| CatalogEntry::new(id, name))
            .collect()
    }
}

pub fn schema(
    catalog: &impl CatalogProvider,
    config: &EngineConfig,
) -> Result<FormSchema, SchemaError> {
    let phone = || Rule::pattern(config.student_phone_pattern());

    let personal = GroupSchema::new(PERSONAL)
        .field(
            FieldSchema::text("fullName", "")
                .rules([Rule::Required, Rule::min_length(config.full_name_min_length())]),
        )
        .field(FieldSchema::text("email", "").rules([Rule::Required, Rule::Email]))
        .field(FieldSchema::text("phone", "").rules([Rule::Required, phone()?]))
        .field(FieldSchema::text("gender", "").rule(Rule::Required))
        .field(FieldSchema::text("dateOfBirth", "").rule(Rule::Required));

    let address = GroupSchema::new(ADDRESS)
        .field(FieldSchema::text("city", "").rule(Rule::Required))
        .field(FieldSchema::text("region", "").rule(Rule::Required))
        .field(FieldSchema::text("digitalAddress", ""));

    let emergency_contact = GroupSchema::new(EMERGENCY_CONTACT)
        .field(FieldSchema::text("contactName", ""))
        .field(FieldSchema::text("relationship", ""))
        .field(FieldSchema::text("contactPhone", ""));

    let link = ReactiveLink::new(HAS_EMERGENCY_CONTACT, Predicate::IsTrue, EMERGENCY_CONTACT)
        .when_active("contactName", vec![Rule::Required])
        .when_active("relationship", vec![Rule::Required])
        .when_active("contactPhone", vec![Rule::Required, phone()?]);

    Ok(FormSchema::new()
        .group(personal)
        .group(address)
        .list(ListSchema::new(COURSES, catalog).rule(ListRule::AtLeastOneSelected))
        .field(FieldSchema::checkbox(HAS_EMERGENCY_CONTACT, false))
        .group(emergency_contact)
        .link(link))
}

/// Fill name, email and phone with sample values
pub fn auto_fill_basic_info(tree: &mut FormTree) -> Result<bool> {
    tree.patch([
        (FULL_NAME, "John Doe"),
        (EMAIL, "john@gmail.com"),
        (PHONE, "1234567890"),
    ])
}
