//! Account repository for database operations.

use crate::entities::{Account, AccountFlags, NewAccount, ProfileChanges};
use crate::types::{StoreError, StoreResult};
use chrono::Utc;
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

const ACCOUNT_COLUMNS: &str = "id, public_id, username, email, password_hash, name, address, phone_number, is_active, is_staff, is_superuser, last_login, date_joined";

/// Repository for account database operations
#[derive(Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Find account by ID
    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    /// Find account by username (exact, case-sensitive)
    pub async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    /// Find account by email (exact)
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    /// Insert a new account; uniqueness violations surface as
    /// `DuplicateUsername` / `DuplicateEmail`
    pub async fn create(&self, account: &NewAccount) -> StoreResult<Account> {
        let now = Utc::now().to_rfc3339();
        let public_id = CUID.create_id();

        let result = sqlx::query(
            "INSERT INTO accounts (public_id, username, email, password_hash, name, address, phone_number, is_active, is_staff, is_superuser, date_joined)
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.name)
        .bind(&account.address)
        .bind(&account.phone_number)
        .bind(account.is_staff)
        .bind(account.is_superuser)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let account_id = result.last_insert_rowid();
        debug!(account_id, "inserted account row");

        self.find_by_id(account_id).await?.ok_or_else(|| {
            StoreError::Database("Failed to retrieve created account".to_string())
        })
    }

    /// Overwrite the profile fields of an account
    pub async fn update(&self, account_id: i64, changes: &ProfileChanges) -> StoreResult<Account> {
        let result = sqlx::query(
            "UPDATE accounts SET username = ?, email = ?, name = ?, address = ?, phone_number = ? WHERE id = ?",
        )
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.name)
        .bind(&changes.address)
        .bind(&changes.phone_number)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.find_by_id(account_id).await?.ok_or(StoreError::NotFound)
    }

    /// Stamp `last_login` with the current time
    pub async fn record_login(&self, account_id: i64) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query("UPDATE accounts SET last_login = ? WHERE id = ?")
            .bind(&now)
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    /// Update privilege flags, leaving unset ones untouched
    pub async fn set_flags(&self, account_id: i64, flags: AccountFlags) -> StoreResult<Account> {
        let result = sqlx::query(
            "UPDATE accounts SET
                is_active = COALESCE(?, is_active),
                is_staff = COALESCE(?, is_staff),
                is_superuser = COALESCE(?, is_superuser)
             WHERE id = ?",
        )
        .bind(flags.is_active)
        .bind(flags.is_staff)
        .bind(flags.is_superuser)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.find_by_id(account_id).await?.ok_or(StoreError::NotFound)
    }

    /// Case-insensitive substring search over email and username, ordered by email
    pub async fn search(&self, query: &str) -> StoreResult<Vec<Account>> {
        let pattern = format!("%{}%", escape_like(query.trim()));

        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             WHERE email LIKE ? ESCAPE '\\' OR username LIKE ? ESCAPE '\\'
             ORDER BY email ASC"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(account_from_row).collect()
    }
}

fn account_from_row(row: &SqliteRow) -> StoreResult<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        phone_number: row.try_get("phone_number")?,
        is_active: row.try_get("is_active")?,
        is_staff: row.try_get("is_staff")?,
        is_superuser: row.try_get("is_superuser")?,
        last_login: row.try_get("last_login")?,
        date_joined: row.try_get("date_joined")?,
    })
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
