use accounts_config::AuthConfig;
use accounts_database::{SessionRepository, StoreError};
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use rand::RngCore;
use sqlx::SqlitePool;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

// Ten years; keeps expiry arithmetic far from chrono's limits.
const MAX_SESSION_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Hash verified against when the claimed account does not exist, so a
/// failed lookup costs as much as a failed password check.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| Credentials.hash("timing-equalizer").ok());

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("stored password hash is malformed")]
    MalformedHash,
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
    #[error("stored session expiry is malformed")]
    MalformedExpiry,
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Argon2 password hashing and verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct Credentials;

impl Credentials {
    /// Hash a plaintext password into a PHC string with a fresh salt
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Check a plaintext password against a stored PHC string
    pub fn verify(&self, password: &str, stored_hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::MalformedHash)?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burn one verification worth of work; the result is always discarded
    pub fn verify_dummy(&self, password: &str) {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = self.verify(password, hash);
        }
    }
}

/// Opaque bearer value identifying a session.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// A freshly created session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub account_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Database-backed session lifecycle: issue, resolve, revoke.
#[derive(Clone)]
pub struct SessionService {
    repository: SessionRepository,
    session_ttl: Duration,
}

impl SessionService {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        let ttl_seconds = config.session_ttl_seconds.min(MAX_SESSION_TTL_SECONDS);

        Self {
            repository: SessionRepository::new(pool),
            session_ttl: Duration::seconds(ttl_seconds as i64),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Issue a new session bound to `account_id`
    pub async fn create(&self, account_id: i64) -> AuthResult<IssuedSession> {
        let token = generate_session_token();
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        self.repository
            .create(
                account_id,
                &token,
                &format_timestamp(now),
                &format_timestamp(expires_at),
            )
            .await?;

        debug!(account_id, %expires_at, "session issued");

        Ok(IssuedSession {
            token: SessionToken(token),
            account_id,
            expires_at,
        })
    }

    /// Revoke a session; returns whether it existed
    pub async fn destroy(&self, token: &SessionToken) -> AuthResult<bool> {
        Ok(self.repository.delete_by_token(token.as_str()).await?)
    }

    /// Revoke every session of an account
    pub async fn destroy_all(&self, account_id: i64) -> AuthResult<u64> {
        let removed = self.repository.delete_by_account_id(account_id).await?;
        if removed > 0 {
            info!(account_id, removed, "revoked account sessions");
        }
        Ok(removed)
    }

    /// Resolve a token to its account; expired sessions are deleted and yield `None`
    pub async fn current_account_id(&self, token: &SessionToken) -> AuthResult<Option<i64>> {
        let Some(session) = self.repository.find_by_token(token.as_str()).await? else {
            return Ok(None);
        };

        let expires_at = DateTime::parse_from_rfc3339(&session.expires_at)
            .map_err(|_| AuthError::MalformedExpiry)?
            .with_timezone(&Utc);

        if expires_at <= Utc::now() {
            self.repository.delete_by_token(token.as_str()).await?;
            debug!(account_id = session.account_id, "expired session discarded");
            return Ok(None);
        }

        Ok(Some(session.account_id))
    }

    /// Delete all sessions past their expiry
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let removed = self
            .repository
            .delete_expired(&format_timestamp(Utc::now()))
            .await?;
        if removed > 0 {
            info!(removed, "purged expired sessions");
        }
        Ok(removed)
    }
}

// Fixed-width UTC so stored expiries compare correctly as text.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
