//! Configuration handling for the form presets

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Minimum age, in whole years, for date-of-birth fields
pub const DEFAULT_MIN_AGE_YEARS: u32 = 10;
/// Minimum length of the student full name
pub const DEFAULT_FULL_NAME_MIN_LENGTH: usize = 3;
/// Digits only
pub const DEFAULT_STUDENT_PHONE_PATTERN: &str = r"^\d+$";
/// Ten digits starting with 02 or 05
pub const DEFAULT_DEMO_PHONE_PATTERN: &str = r"^0[25]\d{8}$";

/// User configuration for the engine presets
///
/// Every field is optional; absent values fall back to the defaults above.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    /// Minimum age for date-of-birth fields
    pub min_age_years: Option<u32>,
    /// Minimum length of the student full name
    pub full_name_min_length: Option<usize>,
    /// Pattern for student and emergency contact phone numbers
    pub student_phone_pattern: Option<String>,
    /// Pattern for the demo form phone number
    pub demo_phone_pattern: Option<String>,
}

impl EngineConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "formtree", "formtree")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config dir
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file, defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Save configuration to the platform config dir
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn min_age_years(&self) -> u32 {
        self.min_age_years.unwrap_or(DEFAULT_MIN_AGE_YEARS)
    }

    pub fn full_name_min_length(&self) -> usize {
        self.full_name_min_length
            .unwrap_or(DEFAULT_FULL_NAME_MIN_LENGTH)
    }

    pub fn student_phone_pattern(&self) -> &str {
        self.student_phone_pattern
            .as_deref()
            .unwrap_or(DEFAULT_STUDENT_PHONE_PATTERN)
    }

    pub fn demo_phone_pattern(&self) -> &str {
        self.demo_phone_pattern
            .as_deref()
            .unwrap_or(DEFAULT_DEMO_PHONE_PATTERN)
    }
}
