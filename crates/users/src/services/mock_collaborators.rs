//! In-memory collaborators for exercising the workflow without a database

use super::collaborators::{AccountStore, CredentialService, SessionManager};
use accounts_auth::{AuthError, AuthResult, IssuedSession, SessionToken};
use accounts_database::{
    Account, AccountFlags, NewAccount, ProfileChanges, StoreError, StoreResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

const MOCK_HASH_PREFIX: &str = "mock$";

/// Account store backed by a vector, enforcing the same uniqueness rules as
/// the database
#[derive(Clone, Default)]
pub struct MockStore {
    accounts: Arc<RwLock<Vec<Account>>>,
    broken_login_stamp: Arc<AtomicBool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Make every later `record_login` fail as if the database were down
    pub fn break_login_stamp(&self) {
        self.broken_login_stamp.store(true, Ordering::SeqCst);
    }

    fn conflict(
        accounts: &[Account],
        except: Option<i64>,
        username: &str,
        email: &str,
    ) -> Option<StoreError> {
        let others = accounts.iter().filter(|a| Some(a.id) != except);
        for account in others {
            if account.username == username {
                return Some(StoreError::DuplicateUsername);
            }
            if account.email == email {
                return Some(StoreError::DuplicateEmail);
            }
        }
        None
    }
}

impl AccountStore for MockStore {
    async fn create(&self, account: &NewAccount) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if let Some(error) = Self::conflict(&accounts, None, &account.username, &account.email) {
            return Err(error);
        }

        let id = accounts.len() as i64 + 1;
        let created = Account {
            id,
            public_id: format!("acct_{id}"),
            username: account.username.clone(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            name: account.name.clone(),
            address: account.address.clone(),
            phone_number: account.phone_number.clone(),
            is_active: true,
            is_staff: account.is_staff,
            is_superuser: account.is_superuser,
            last_login: None,
            date_joined: "2024-01-01T00:00:00Z".into(),
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn update(&self, id: i64, changes: &ProfileChanges) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if let Some(error) = Self::conflict(&accounts, Some(id), &changes.username, &changes.email)
        {
            return Err(error);
        }

        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound)?;
        account.username = changes.username.clone();
        account.email = changes.email.clone();
        account.name = changes.name.clone();
        account.address = changes.address.clone();
        account.phone_number = changes.phone_number.clone();
        Ok(account.clone())
    }

    async fn record_login(&self, id: i64) -> StoreResult<()> {
        if self.broken_login_stamp.load(Ordering::SeqCst) {
            return Err(StoreError::Database("disk I/O error".into()));
        }
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound)?;
        account.last_login = Some("2024-01-02T00:00:00Z".into());
        Ok(())
    }

    async fn set_flags(&self, id: i64, flags: AccountFlags) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound)?;
        if let Some(is_active) = flags.is_active {
            account.is_active = is_active;
        }
        if let Some(is_staff) = flags.is_staff {
            account.is_staff = is_staff;
        }
        if let Some(is_superuser) = flags.is_superuser {
            account.is_superuser = is_superuser;
        }
        Ok(account.clone())
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Account>> {
        let needle = query.trim().to_lowercase();
        let accounts = self.accounts.read().await;
        let mut found: Vec<Account> = accounts
            .iter()
            .filter(|a| {
                a.email.to_lowercase().contains(&needle)
                    || a.username.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(found)
    }
}

/// Reversible "hashing" so tests stay fast
#[derive(Default)]
pub struct MockCredentials {
    dummy_verifications: AtomicUsize,
}

impl MockCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dummy_verifications(&self) -> usize {
        self.dummy_verifications.load(Ordering::SeqCst)
    }
}

impl CredentialService for MockCredentials {
    fn hash(&self, plaintext: &str) -> AuthResult<String> {
        Ok(format!("{MOCK_HASH_PREFIX}{plaintext}"))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> AuthResult<bool> {
        let stored = hash
            .strip_prefix(MOCK_HASH_PREFIX)
            .ok_or(AuthError::MalformedHash)?;
        Ok(stored == plaintext)
    }

    fn verify_dummy(&self, _plaintext: &str) {
        self.dummy_verifications.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sessions that never expire
#[derive(Clone, Default)]
pub struct MockSessions {
    sessions: Arc<RwLock<HashMap<String, i64>>>,
    issued: Arc<AtomicUsize>,
}

impl MockSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl SessionManager for MockSessions {
    async fn create(&self, account_id: i64) -> AuthResult<IssuedSession> {
        let serial = self.issued.fetch_add(1, Ordering::SeqCst);
        let token = format!("session-{serial}");
        self.sessions.write().await.insert(token.clone(), account_id);

        Ok(IssuedSession {
            token: SessionToken::new(token),
            account_id,
            expires_at: chrono::DateTime::<chrono::Utc>::MAX_UTC,
        })
    }

    async fn destroy(&self, token: &SessionToken) -> AuthResult<bool> {
        Ok(self.sessions.write().await.remove(token.as_str()).is_some())
    }

    async fn current_account_id(&self, token: &SessionToken) -> AuthResult<Option<i64>> {
        Ok(self.sessions.read().await.get(token.as_str()).copied())
    }

    async fn destroy_all(&self, account_id: i64) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, owner| *owner != account_id);
        Ok((before - sessions.len()) as u64)
    }
}
