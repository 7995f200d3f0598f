//! Shared application state for the gateway

use accounts_auth::{Credentials, SessionService};
use accounts_config::AuthConfig;
use accounts_database::{AccountRepository, DatabaseConnection, Pool};
use accounts_users::{AccountWorkflow, DatabaseWorkflow};
use std::sync::Arc;

/// State handed to every handler
#[derive(Clone)]
pub struct GatewayState {
    database: DatabaseConnection,
    workflow: Arc<DatabaseWorkflow>,
    /// Whether the session cookie carries the `Secure` attribute
    cookie_secure: bool,
}

impl GatewayState {
    pub fn new(pool: Pool, workflow: Arc<DatabaseWorkflow>, auth: &AuthConfig) -> Self {
        Self {
            database: DatabaseConnection { pool },
            workflow,
            cookie_secure: auth.cookie_secure,
        }
    }

    /// Wire the workflow straight from a pool
    pub fn from_pool(pool: Pool, auth: &AuthConfig) -> Self {
        let workflow = AccountWorkflow::new(
            AccountRepository::new(pool.clone()),
            Credentials,
            SessionService::new(pool.clone(), auth),
        );
        Self::new(pool, Arc::new(workflow), auth)
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    pub fn workflow(&self) -> &DatabaseWorkflow {
        &self.workflow
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}
