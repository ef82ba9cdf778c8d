use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Malformed stored value: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

// Command responses carry the error as a plain message
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}

/// Error type for Focus Guard initialization failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not determine project directories")]
    NoProjectDirs,

    #[error("Could not create data directory: {0}")]
    DataDirCreation(#[source] std::io::Error),

    #[error("Failed to open database: {0}")]
    DatabaseOpen(#[source] rusqlite::Error),

    #[error("Failed to run database migrations: {0}")]
    Migration(#[source] rusqlite::Error),
}
