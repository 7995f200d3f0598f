//! Error types for the account workflow.

use crate::validation::{FieldError, FieldErrors};
use accounts_auth::AuthError;
use accounts_database::StoreError;
use thiserror::Error;

/// Unique account attribute a store conflict is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Username,
    Email,
}

impl AccountField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }

    pub fn duplicate_error(self) -> FieldError {
        match self {
            Self::Username => FieldError::DuplicateUsername,
            Self::Email => FieldError::DuplicateEmail,
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("submitted form is invalid")]
    Validation(FieldErrors),

    #[error("{}", .0.duplicate_error())]
    DuplicateAccount(AccountField),

    #[error("Login failed. Please check your credentials.")]
    AuthenticationFailure,

    #[error("access denied")]
    AccessDenied,

    #[error("account not found")]
    AccountNotFound,

    #[error("account store error: {0}")]
    Store(StoreError),

    #[error("credential error: {0}")]
    Credential(AuthError),

    #[error("session error: {0}")]
    Session(AuthError),
}

impl WorkflowError {
    /// Field-attributed errors, for the failures a user can correct
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::DuplicateAccount(field) => {
                Some(FieldErrors::single(field.as_str(), field.duplicate_error()))
            }
            _ => None,
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateUsername => Self::DuplicateAccount(AccountField::Username),
            StoreError::DuplicateEmail => Self::DuplicateAccount(AccountField::Email),
            StoreError::NotFound => Self::AccountNotFound,
            other => Self::Store(other),
        }
    }
}

impl From<FieldErrors> for WorkflowError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
