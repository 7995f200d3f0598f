//! # Accounts Users Crate
//!
//! The account lifecycle: registration, login, profile editing, logout and
//! the administrative directory.
//!
//! ## Architecture
//!
//! - **Validation**: pure field validators and error collection
//! - **Forms**: submitted payloads and their cleaning
//! - **Services**: the [`AccountWorkflow`] and the collaborator traits it
//!   runs against ([`AccountStore`], [`CredentialService`], [`SessionManager`])
//! - **Types**: errors, notifications and outcomes

pub mod forms;
pub mod services;
pub mod types;
pub mod validation;

use accounts_auth::{Credentials, SessionService};
use accounts_database::AccountRepository;

pub use forms::{FormEcho, LoginForm, ProfileForm, RegistrationForm};
pub use services::{AccountStore, AccountWorkflow, CredentialService, SessionManager};
pub use types::{
    locations, AccountField, DashboardView, Level, Notification, Outcome, WorkflowError,
    WorkflowResult,
};
pub use validation::{
    validate_email, validate_passwords_match, validate_phone_number, FieldError, FieldErrors,
};

/// The workflow wired to SQLite, argon2 and database sessions
pub type DatabaseWorkflow = AccountWorkflow<AccountRepository, Credentials, SessionService>;
