//! Domain error types.

/// Top-level error type for tradejournal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("cannot parse {field} value {value:?}")]
    Parse { field: String, value: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("no user is signed in")]
    NotSignedIn,

    #[error("no trade with id {id}")]
    NotFound { id: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl JournalError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        JournalError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn store(reason: impl ToString) -> Self {
        JournalError::Store {
            reason: reason.to_string(),
        }
    }
}

impl From<&JournalError> for std::process::ExitCode {
    fn from(err: &JournalError) -> Self {
        let code: u8 = match err {
            JournalError::Io(_) => 1,
            JournalError::ConfigParse { .. }
            | JournalError::ConfigMissing { .. }
            | JournalError::ConfigInvalid { .. } => 2,
            JournalError::Store { .. } => 3,
            JournalError::Parse { .. } | JournalError::Validation { .. } => 4,
            JournalError::NotSignedIn | JournalError::NotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
