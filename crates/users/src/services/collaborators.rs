//! Contracts the workflow consumes, with their production implementations.

use accounts_auth::{AuthResult, Credentials, IssuedSession, SessionService, SessionToken};
use accounts_database::{
    Account, AccountFlags, AccountRepository, NewAccount, ProfileChanges, StoreResult,
};
use std::future::Future;

/// Persistence for accounts
pub trait AccountStore: Send + Sync {
    fn create(&self, account: &NewAccount) -> impl Future<Output = StoreResult<Account>> + Send;
    fn find_by_id(&self, id: i64) -> impl Future<Output = StoreResult<Option<Account>>> + Send;
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = StoreResult<Option<Account>>> + Send;
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<Account>>> + Send;
    fn update(
        &self,
        id: i64,
        changes: &ProfileChanges,
    ) -> impl Future<Output = StoreResult<Account>> + Send;
    fn record_login(&self, id: i64) -> impl Future<Output = StoreResult<()>> + Send;
    fn set_flags(
        &self,
        id: i64,
        flags: AccountFlags,
    ) -> impl Future<Output = StoreResult<Account>> + Send;
    fn search(&self, query: &str) -> impl Future<Output = StoreResult<Vec<Account>>> + Send;
}

/// Password hashing. CPU-bound, so synchronous.
pub trait CredentialService: Send + Sync {
    fn hash(&self, plaintext: &str) -> AuthResult<String>;
    fn verify(&self, plaintext: &str, hash: &str) -> AuthResult<bool>;
    /// Spend the cost of one verification without a stored hash
    fn verify_dummy(&self, plaintext: &str);
}

/// Server-side sessions keyed by opaque tokens
pub trait SessionManager: Send + Sync {
    fn create(&self, account_id: i64) -> impl Future<Output = AuthResult<IssuedSession>> + Send;
    fn destroy(&self, token: &SessionToken) -> impl Future<Output = AuthResult<bool>> + Send;
    fn current_account_id(
        &self,
        token: &SessionToken,
    ) -> impl Future<Output = AuthResult<Option<i64>>> + Send;
    fn destroy_all(&self, account_id: i64) -> impl Future<Output = AuthResult<u64>> + Send;
}

impl AccountStore for AccountRepository {
    async fn create(&self, account: &NewAccount) -> StoreResult<Account> {
        AccountRepository::create(self, account).await
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Account>> {
        AccountRepository::find_by_id(self, id).await
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        AccountRepository::find_by_username(self, username).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        AccountRepository::find_by_email(self, email).await
    }

    async fn update(&self, id: i64, changes: &ProfileChanges) -> StoreResult<Account> {
        AccountRepository::update(self, id, changes).await
    }

    async fn record_login(&self, id: i64) -> StoreResult<()> {
        AccountRepository::record_login(self, id).await
    }

    async fn set_flags(&self, id: i64, flags: AccountFlags) -> StoreResult<Account> {
        AccountRepository::set_flags(self, id, flags).await
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Account>> {
        AccountRepository::search(self, query).await
    }
}

impl CredentialService for Credentials {
    fn hash(&self, plaintext: &str) -> AuthResult<String> {
        Credentials::hash(self, plaintext)
    }

    fn verify(&self, plaintext: &str, hash: &str) -> AuthResult<bool> {
        Credentials::verify(self, plaintext, hash)
    }

    fn verify_dummy(&self, plaintext: &str) {
        Credentials::verify_dummy(self, plaintext)
    }
}

impl SessionManager for SessionService {
    async fn create(&self, account_id: i64) -> AuthResult<IssuedSession> {
        SessionService::create(self, account_id).await
    }

    async fn destroy(&self, token: &SessionToken) -> AuthResult<bool> {
        SessionService::destroy(self, token).await
    }

    async fn current_account_id(&self, token: &SessionToken) -> AuthResult<Option<i64>> {
        SessionService::current_account_id(self, token).await
    }

    async fn destroy_all(&self, account_id: i64) -> AuthResult<u64> {
        SessionService::destroy_all(self, account_id).await
    }
}
