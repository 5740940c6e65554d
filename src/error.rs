// ⚠️ Error taxonomy for the contact pipeline
// Every error is local to one operation: nothing is retried, nothing is partially applied.

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, ContactError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContactError {
    /// Source file unreadable or not valid CSV
    #[error("could not read {path}: {message}")]
    FileRead { path: String, message: String },

    /// Required column absent after load
    #[error("{source_name}: required column '{column}' not found")]
    MissingColumn { source_name: String, column: String },

    /// Quoted-pair text contained no `"Name" <email>` entries
    #[error("no valid names and emails found")]
    NoMatchesFound,

    /// Operation invoked without any files or text
    #[error("no input: {0}")]
    NoInput(String),

    /// Destination could not be written
    #[error("could not write {path}: {message}")]
    Write { path: String, message: String },

    /// Malformed pipeline configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl ContactError {
    pub fn file_read(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ContactError::FileRead {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn write(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ContactError::Write {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn missing_column(source_name: impl Into<String>, column: impl Into<String>) -> Self {
        ContactError::MissingColumn {
            source_name: source_name.into(),
            column: column.into(),
        }
    }
}
