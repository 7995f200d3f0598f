//! Session repository for database operations.

use crate::entities::Session;
use crate::types::StoreResult;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Repository for session database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a session row
    pub async fn create(
        &self,
        account_id: i64,
        token: &str,
        created_at: &str,
        expires_at: &str,
    ) -> StoreResult<Session> {
        let result = sqlx::query(
            "INSERT INTO sessions (account_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(account_id)
        .bind(token)
        .bind(created_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(Session {
            id: result.last_insert_rowid(),
            account_id,
            token: token.to_owned(),
            created_at: created_at.to_owned(),
            expires_at: expires_at.to_owned(),
        })
    }

    /// Find session by token
    pub async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, account_id, token, created_at, expires_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    /// Delete session by token, returning whether a row was removed
    pub async fn delete_by_token(&self, token: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for an account
    pub async fn delete_by_account_id(&self, account_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE account_id = ?")
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete sessions whose expiry lies before `now` (RFC 3339)
    pub async fn delete_expired(&self, now: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Count sessions held by an account
    pub async fn count_for_account(&self, account_id: i64) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE account_id = ?")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn session_from_row(row: &SqliteRow) -> StoreResult<Session> {
    Ok(Session {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        token: row.try_get("token")?,
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}
