//! Error types for forum operations.

use thiserror::Error;

/// Result type alias for forum operations.
pub type Result<T> = std::result::Result<T, ForumError>;

#[derive(Error, Debug)]
pub enum ForumError {
    /// Connection or query failure. Any open transaction has been rolled back.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A row the core itself just looked up is gone.
    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ForumError {
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Maps a unique or foreign-key violation to `Validation`, leaving every
    /// other error as `Storage`.
    pub(crate) fn constraint_or_storage(err: sqlx::Error, msg: &str) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() || db_err.is_foreign_key_violation() => {
                Self::validation(msg)
            }
            _ => Self::Storage(err),
        }
    }
}
