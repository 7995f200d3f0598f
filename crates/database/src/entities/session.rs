//! Session entity definitions

use serde::{Deserialize, Serialize};

/// A server-side record binding one client token to one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub account_id: i64,
    #[serde(skip_serializing, default)]
    pub token: String,
    pub created_at: String,
    pub expires_at: String,
}
