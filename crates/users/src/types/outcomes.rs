//! User-visible results of workflow operations.

use accounts_database::Account;
use serde::Serialize;
use utoipa::ToSchema;

/// Where the client should go next.
pub mod locations {
    pub const LOGIN: &str = "/";
    pub const REGISTER: &str = "/register/";
    pub const DASHBOARD: &str = "/dashboard/";
    pub const PROFILE: &str = "/profile/";
    pub const LOGOUT: &str = "/logout/";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

/// A one-shot message shown to the user after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// A completed operation: its value, what to tell the user, and where to go.
#[derive(Debug, Clone)]
pub struct Outcome<T = ()> {
    pub value: T,
    pub messages: Vec<Notification>,
    pub redirect: &'static str,
}

impl<T> Outcome<T> {
    pub fn new(value: T, message: Notification, redirect: &'static str) -> Self {
        Self {
            value,
            messages: vec![message],
            redirect,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    pub greeting: String,
    #[schema(value_type = Object)]
    pub account: Account,
}
