//! Field validators and form cleaning helpers.
//!
//! Every check is a pure function. Cleaning collects all failures into a
//! [`FieldErrors`] map instead of stopping at the first one, so a caller can
//! report every offending field at once.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

pub const USERNAME_MAX_LENGTH: usize = 100;
pub const NAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const PHONE_NUMBER_LENGTH: usize = 10;

/// A single reason a submitted field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required.")]
    Required,

    #[error("Ensure this value has at most {max} characters (it has {actual}).")]
    TooLong { max: usize, actual: usize },

    #[error("Enter a valid 10-digit phone number.")]
    InvalidPhoneNumber,

    #[error("Enter a valid email address.")]
    InvalidEmail,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("A user with that username already exists.")]
    DuplicateUsername,

    #[error("A user with that email already exists.")]
    DuplicateEmail,
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-field error lists, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<&'static str, Vec<FieldError>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.add(field, error);
        errors
    }

    pub fn add(&mut self, field: &'static str, error: FieldError) {
        self.fields.entry(field).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str, error: &FieldError) -> bool {
        self.get(field)
            .is_some_and(|errors| errors.iter().any(|candidate| candidate == error))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldError)> + '_ {
        self.fields
            .iter()
            .flat_map(|(field, errors)| errors.iter().map(move |error| (*field, error)))
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// `Ok(())` when nothing was recorded, the collected errors otherwise
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, errors) in &self.fields {
            map.serialize_entry(field, errors)?;
        }
        map.end()
    }
}

/// Succeeds iff the value is exactly ten ASCII decimal digits.
pub fn validate_phone_number(value: &str) -> Result<&str, FieldError> {
    if value.len() == PHONE_NUMBER_LENGTH && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(value)
    } else {
        Err(FieldError::InvalidPhoneNumber)
    }
}

/// Succeeds iff the value is non-empty and contains `@`.
///
/// This is only a shape check: `"@"` on its own is accepted.
pub fn validate_email(value: &str) -> Result<&str, FieldError> {
    if !value.is_empty() && value.contains('@') {
        Ok(value)
    } else {
        Err(FieldError::InvalidEmail)
    }
}

/// Fails only when both values are present and differ.
pub fn validate_passwords_match(password: &str, confirmation: &str) -> Result<(), FieldError> {
    if !password.is_empty() && !confirmation.is_empty() && password != confirmation {
        return Err(FieldError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_max_length(value: &str, max: usize) -> Result<&str, FieldError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(FieldError::TooLong { max, actual });
    }
    Ok(value)
}

/// Trim a text field and record `Required` when nothing remains.
///
/// Returns `None` when the field is missing so follow-up checks can be skipped.
pub(crate) fn clean_required_text(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, FieldError::Required);
        return None;
    }
    Some(trimmed.to_owned())
}

/// Passwords are taken verbatim; whitespace is significant.
pub(crate) fn clean_required_secret(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
) -> Option<String> {
    if raw.is_empty() {
        errors.add(field, FieldError::Required);
        return None;
    }
    Some(raw.to_owned())
}

/// Run `check` against an already-cleaned value, recording its failure.
pub(crate) fn check<F>(errors: &mut FieldErrors, field: &'static str, value: &str, check: F)
where
    F: FnOnce(&str) -> Result<&str, FieldError>,
{
    if let Err(error) = check(value) {
        errors.add(field, error);
    }
}
