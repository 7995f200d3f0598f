//! Error types for the database layer

use thiserror::Error;

/// Errors raised while opening or migrating the database
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Errors raised by the account and session repositories
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Account not found")]
    NotFound,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                // SQLite reports "UNIQUE constraint failed: accounts.<column>"
                if message.contains("UNIQUE constraint failed") {
                    if message.contains("accounts.username") {
                        return StoreError::DuplicateUsername;
                    }
                    if message.contains("accounts.email") {
                        return StoreError::DuplicateEmail;
                    }
                }
                StoreError::Database(message.to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}
