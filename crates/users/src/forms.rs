//! Submitted form payloads and their cleaned counterparts.

use crate::validation::{
    check, clean_required_secret, clean_required_text, validate_email, validate_max_length,
    validate_passwords_match, validate_phone_number, FieldErrors, EMAIL_MAX_LENGTH,
    NAME_MAX_LENGTH, USERNAME_MAX_LENGTH,
};
use accounts_database::{Account, ProfileChanges};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// Non-secret submitted values, echoed back when a form is rejected.
pub type FormEcho = BTreeMap<&'static str, String>;

#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub name: String,
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanRegistration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub address: String,
    pub phone_number: String,
    pub name: String,
}

impl RegistrationForm {
    pub fn clean(&self) -> Result<CleanRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = clean_required_text(&mut errors, "username", &self.username);
        let password = clean_required_secret(&mut errors, "password", &self.password);
        let confirmation = clean_required_secret(
            &mut errors,
            "password_confirmation",
            &self.password_confirmation,
        );
        let profile = clean_profile_fields(
            &mut errors,
            &self.email,
            &self.address,
            &self.phone_number,
            &self.name,
        );

        if let Some(username) = &username {
            check(&mut errors, "username", username, |v| {
                validate_max_length(v, USERNAME_MAX_LENGTH)
            });
        }
        if let Err(error) = validate_passwords_match(
            password.as_deref().unwrap_or_default(),
            confirmation.as_deref().unwrap_or_default(),
        ) {
            errors.add("password_confirmation", error);
        }

        errors.into_result()?;

        match (username, password, profile) {
            (Some(username), Some(password), Some((email, address, phone_number, name))) => {
                Ok(CleanRegistration {
                    username,
                    password,
                    email,
                    address,
                    phone_number,
                    name,
                })
            }
            // A missing value always records an error above.
            _ => Err(FieldErrors::new()),
        }
    }

    pub fn echo(&self) -> FormEcho {
        FormEcho::from([
            ("username", self.username.clone()),
            ("email", self.email.clone()),
            ("address", self.address.clone()),
            ("phone_number", self.phone_number.clone()),
            ("name", self.name.clone()),
        ])
    }
}

#[derive(Clone, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl LoginForm {
    pub fn echo(&self) -> FormEcho {
        FormEcho::from([("username", self.username.clone())])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub name: String,
}

impl ProfileForm {
    pub fn clean(&self) -> Result<ProfileChanges, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = clean_required_text(&mut errors, "username", &self.username);
        if let Some(username) = &username {
            check(&mut errors, "username", username, |v| {
                validate_max_length(v, USERNAME_MAX_LENGTH)
            });
        }
        let profile = clean_profile_fields(
            &mut errors,
            &self.email,
            &self.address,
            &self.phone_number,
            &self.name,
        );

        errors.into_result()?;

        match (username, profile) {
            (Some(username), Some((email, address, phone_number, name))) => Ok(ProfileChanges {
                username,
                email,
                name,
                address,
                phone_number,
            }),
            _ => Err(FieldErrors::new()),
        }
    }

    pub fn echo(&self) -> FormEcho {
        FormEcho::from([
            ("username", self.username.clone()),
            ("email", self.email.clone()),
            ("address", self.address.clone()),
            ("phone_number", self.phone_number.clone()),
            ("name", self.name.clone()),
        ])
    }
}

impl From<&Account> for ProfileForm {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            email: account.email.clone(),
            address: account.address.clone(),
            phone_number: account.phone_number.clone(),
            name: account.name.clone(),
        }
    }
}

/// Cleans the fields shared by registration and profile editing.
/// Yields `(email, address, phone_number, name)` when all four are present.
fn clean_profile_fields(
    errors: &mut FieldErrors,
    email: &str,
    address: &str,
    phone_number: &str,
    name: &str,
) -> Option<(String, String, String, String)> {
    let email = clean_required_text(errors, "email", email);
    if let Some(email) = &email {
        check(errors, "email", email, |v| {
            validate_max_length(v, EMAIL_MAX_LENGTH)
        });
        check(errors, "email", email, validate_email);
    }

    let address = clean_required_text(errors, "address", address);

    let phone_number = clean_required_text(errors, "phone_number", phone_number);
    if let Some(phone_number) = &phone_number {
        check(errors, "phone_number", phone_number, validate_phone_number);
    }

    let name = clean_required_text(errors, "name", name);
    if let Some(name) = &name {
        check(errors, "name", name, |v| validate_max_length(v, NAME_MAX_LENGTH));
    }

    Some((email?, address?, phone_number?, name?))
}
