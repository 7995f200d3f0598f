//! The account lifecycle: register, log in, edit profile, log out.
//!
//! Each operation spells out its steps (clean, hash, persist, notify)
//! against the collaborator traits, and takes the caller's account id or
//! session token explicitly.

use super::collaborators::{AccountStore, CredentialService, SessionManager};
use crate::forms::{LoginForm, ProfileForm, RegistrationForm};
use crate::types::{
    locations, AccountField, DashboardView, Notification, Outcome, WorkflowError, WorkflowResult,
};
use crate::validation::FieldErrors;
use accounts_auth::{IssuedSession, SessionToken};
use accounts_database::{Account, AccountFlags, NewAccount};
use tracing::{debug, info, warn};

pub struct AccountWorkflow<S, C, M> {
    store: S,
    credentials: C,
    sessions: M,
}

impl<S, C, M> AccountWorkflow<S, C, M>
where
    S: AccountStore,
    C: CredentialService,
    M: SessionManager,
{
    pub fn new(store: S, credentials: C, sessions: M) -> Self {
        Self {
            store,
            credentials,
            sessions,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sessions(&self) -> &M {
        &self.sessions
    }

    /// Create a regular account. No session is issued.
    pub async fn register(&self, form: &RegistrationForm) -> WorkflowResult<Outcome<Account>> {
        let account = self.create_account(form, false).await?;
        info!(account_id = account.id, "account registered");

        Ok(Outcome::new(
            account,
            Notification::success("Registration successful"),
            locations::LOGIN,
        ))
    }

    /// Authenticate and issue a fresh session.
    ///
    /// Unknown usernames, wrong passwords and inactive accounts all fail with
    /// the same [`WorkflowError::AuthenticationFailure`]. A token the client
    /// already holds is revoked once the new session is granted.
    pub async fn login(
        &self,
        form: &LoginForm,
        presented: Option<&SessionToken>,
    ) -> WorkflowResult<Outcome<IssuedSession>> {
        let username = form.username.trim();

        let account = match self.store.find_by_username(username).await? {
            Some(account) => account,
            None => {
                self.credentials.verify_dummy(&form.password);
                debug!("login rejected: unknown username");
                return Err(WorkflowError::AuthenticationFailure);
            }
        };

        let verified = self
            .credentials
            .verify(&form.password, &account.password_hash)
            .map_err(WorkflowError::Credential)?;

        if !verified || !account.is_active {
            warn!(account_id = account.id, "login rejected");
            return Err(WorkflowError::AuthenticationFailure);
        }

        // Stamp first so a store failure leaves no fresh session behind.
        self.store.record_login(account.id).await?;

        if let Some(previous) = presented {
            self.sessions
                .destroy(previous)
                .await
                .map_err(WorkflowError::Session)?;
        }

        let session = self
            .sessions
            .create(account.id)
            .await
            .map_err(WorkflowError::Session)?;

        info!(account_id = account.id, "login succeeded");

        Ok(Outcome::new(
            session,
            Notification::success("Login successful"),
            locations::DASHBOARD,
        ))
    }

    /// Resolve a session token to its account, if the session is live and
    /// the account still active.
    pub async fn current_account(&self, token: &SessionToken) -> WorkflowResult<Option<Account>> {
        let Some(account_id) = self
            .sessions
            .current_account_id(token)
            .await
            .map_err(WorkflowError::Session)?
        else {
            return Ok(None);
        };

        let account = self.store.find_by_id(account_id).await?;
        Ok(account.filter(|account| account.is_active))
    }

    /// Current values for the profile view
    pub async fn profile(&self, account_id: i64) -> WorkflowResult<ProfileForm> {
        let account = self.account(account_id).await?;
        Ok(ProfileForm::from(&account))
    }

    pub async fn dashboard(&self, account_id: i64) -> WorkflowResult<DashboardView> {
        let account = self.account(account_id).await?;
        let greeting = format!("Welcome, {}!", account.name);
        Ok(DashboardView { greeting, account })
    }

    /// Overwrite the caller's own profile fields.
    ///
    /// Username and email clashes with other accounts are reported together
    /// with any other field errors.
    pub async fn edit_profile(
        &self,
        account_id: i64,
        form: &ProfileForm,
    ) -> WorkflowResult<Outcome<Account>> {
        let (changes, mut errors) = match form.clean() {
            Ok(changes) => (Some(changes), FieldErrors::new()),
            Err(errors) => (None, errors),
        };

        let username = form.username.trim();
        if !username.is_empty() {
            if let Some(other) = self.store.find_by_username(username).await? {
                if other.id != account_id {
                    errors.add("username", AccountField::Username.duplicate_error());
                }
            }
        }

        let email = form.email.trim();
        if !email.is_empty() {
            if let Some(other) = self.store.find_by_email(email).await? {
                if other.id != account_id {
                    errors.add("email", AccountField::Email.duplicate_error());
                }
            }
        }

        errors.into_result()?;
        let Some(changes) = changes else {
            return Err(WorkflowError::Validation(FieldErrors::new()));
        };

        let account = self.store.update(account_id, &changes).await?;
        info!(account_id, "profile updated");

        Ok(Outcome::new(
            account,
            Notification::success("Profile Updated"),
            locations::PROFILE,
        ))
    }

    pub async fn logout(&self, token: &SessionToken) -> WorkflowResult<Outcome> {
        let existed = self
            .sessions
            .destroy(token)
            .await
            .map_err(WorkflowError::Session)?;
        debug!(existed, "session destroyed");

        Ok(Outcome::new(
            (),
            Notification::success("Logged out successfully"),
            locations::LOGIN,
        ))
    }

    /// Directory search on behalf of `actor_id`; staff only
    pub async fn search_accounts(&self, actor_id: i64, query: &str) -> WorkflowResult<Vec<Account>> {
        let actor = self.store.find_by_id(actor_id).await?;
        if !actor.is_some_and(|actor| actor.is_active && actor.is_staff) {
            warn!(actor_id, "account directory access denied");
            return Err(WorkflowError::AccessDenied);
        }

        Ok(self.store.search(query).await?)
    }

    /// Directory search for operators with direct access (the CLI)
    pub async fn list_accounts(&self, query: &str) -> WorkflowResult<Vec<Account>> {
        Ok(self.store.search(query).await?)
    }

    /// Create an account with staff and superuser privileges
    pub async fn create_superuser(&self, form: &RegistrationForm) -> WorkflowResult<Account> {
        let account = self.create_account(form, true).await?;
        info!(account_id = account.id, "superuser created");
        Ok(account)
    }

    /// Change privilege flags by username; deactivation revokes all sessions
    pub async fn set_flags(&self, username: &str, flags: AccountFlags) -> WorkflowResult<Account> {
        let account = self
            .store
            .find_by_username(username)
            .await?
            .ok_or(WorkflowError::AccountNotFound)?;

        let account = self.store.set_flags(account.id, flags).await?;

        if flags.is_active == Some(false) {
            self.sessions
                .destroy_all(account.id)
                .await
                .map_err(WorkflowError::Session)?;
        }

        info!(
            account_id = account.id,
            is_active = account.is_active,
            is_staff = account.is_staff,
            is_superuser = account.is_superuser,
            "account flags updated"
        );
        Ok(account)
    }

    async fn account(&self, account_id: i64) -> WorkflowResult<Account> {
        self.store
            .find_by_id(account_id)
            .await?
            .ok_or(WorkflowError::AccountNotFound)
    }

    async fn create_account(
        &self,
        form: &RegistrationForm,
        privileged: bool,
    ) -> WorkflowResult<Account> {
        let clean = form.clean()?;

        let password_hash = self
            .credentials
            .hash(&clean.password)
            .map_err(WorkflowError::Credential)?;

        let account = self
            .store
            .create(&NewAccount {
                username: clean.username,
                email: clean.email,
                password_hash,
                name: clean.name,
                address: clean.address,
                phone_number: clean.phone_number,
                is_staff: privileged,
                is_superuser: privileged,
            })
            .await?;

        Ok(account)
    }
}
