//! Accounts Database Crate
//!
//! This crate provides the persistence layer for the accounts backend:
//! connection management, embedded migrations, and the account and session
//! repositories.

use accounts_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod migrations;
pub mod repos;
pub mod entities;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

pub use repos::{AccountRepository, SessionRepository};

pub use entities::{
    account::{Account, AccountFlags, NewAccount, ProfileChanges},
    session::Session,
};

pub use types::{
    errors::{DatabaseError, StoreError},
    DatabaseResult, StoreResult,
};

pub use sqlx::SqlitePool as Pool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
