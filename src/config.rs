// ⚙️ Pipeline configuration (TOML)
//
// Every field has a default, so an empty file or no file at all means the
// stock behavior:
//
//   [repair]
//   placeholder_names = ["legal name"]
//   keep_last_name_on_partial_recovery = true
//
//   [subtract]
//   case_sensitive = false

use crate::error::{ContactError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub repair: RepairConfig,

    #[serde(default)]
    pub subtract: SubtractConfig,
}

// ----------------------------------------------------------------------------
// Repair
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepairConfig {
    /// First-name values that stand for "no real name" (trimmed, case-insensitive)
    #[serde(default = "default_placeholders")]
    pub placeholder_names: Vec<String>,

    /// When email recovery finds a first name but no last name, keep the
    /// row's existing last name instead of clearing it
    #[serde(default = "default_true")]
    pub keep_last_name_on_partial_recovery: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        RepairConfig {
            placeholder_names: default_placeholders(),
            keep_last_name_on_partial_recovery: true,
        }
    }
}

impl RepairConfig {
    pub fn is_placeholder(&self, value: &str) -> bool {
        let value = value.trim();
        self.placeholder_names
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(value))
    }
}

fn default_placeholders() -> Vec<String> {
    vec!["legal name".to_string()]
}

fn default_true() -> bool {
    true
}

// ----------------------------------------------------------------------------
// Subtract
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubtractConfig {
    /// Compare raw emails byte-for-byte in the two-table subtraction
    #[serde(default)]
    pub case_sensitive: bool,
}

// ----------------------------------------------------------------------------
// Loading
// ----------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ContactError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ContactError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}
