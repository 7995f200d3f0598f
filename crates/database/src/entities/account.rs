use serde::{Deserialize, Serialize};

/// A persisted user identity with credentials and profile fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// Database primary key
    pub id: i64,
    /// Identifier exposed to clients
    pub public_id: String,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<String>,
    pub date_joined: String,
}

/// Fields required to insert an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// User-editable profile fields, written as a whole
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileChanges {
    pub username: String,
    pub email: String,
    pub name: String,
    pub address: String,
    pub phone_number: String,
}

/// Privilege flags; `None` leaves the stored value untouched
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccountFlags {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl AccountFlags {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_staff.is_none() && self.is_superuser.is_none()
    }
}
