// 📇 Contact Record - the canonical (First Name, Last Name, Email) shape
// Every loader and parser produces these; every engine consumes them.

use serde::{Deserialize, Serialize};

/// Header row written for named output files
pub const HEADERS: [&str; 3] = ["First Name", "Last Name", "Email"];

pub const FIRST_NAME: &str = "First Name";
pub const LAST_NAME: &str = "Last Name";
pub const EMAIL: &str = "Email";

/// One contact row
///
/// An empty field means the source cell was absent. After a repair pass the
/// email is lowercase and both names are non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "First Name")]
    pub first_name: String,

    #[serde(rename = "Last Name")]
    pub last_name: String,

    #[serde(rename = "Email")]
    pub email: String,
}

/// Ordered records, concatenated from one or more sources in input order
pub type RecordCollection = Vec<Record>;

impl Record {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Record {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// Email-only row (no name information available)
    pub fn email_only(email: impl Into<String>) -> Self {
        Record {
            email: email.into(),
            ..Record::default()
        }
    }

    /// Key used by every case-insensitive comparison
    pub fn email_key(&self) -> String {
        self.email.to_lowercase()
    }

    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }

    /// Fields in output column order
    pub fn as_row(&self) -> [&str; 3] {
        [&self.first_name, &self.last_name, &self.email]
    }
}
