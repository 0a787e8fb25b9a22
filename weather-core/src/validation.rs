//! Request input validation.
//!
//! Errors are collected per field so the HTTP layer can return all of them at
//! once, keyed the same way the request body is.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const MAX_STRING_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Field name → messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-message error for `field`.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first_message(&self) -> Option<&str> {
        self.fields
            .values()
            .flat_map(|messages| messages.first())
            .map(String::as_str)
            .next()
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first_message().unwrap_or("The given data was invalid."))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check a required string field and return it trimmed.
fn required<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => {
            if v.chars().count() > MAX_STRING_LEN {
                errors.add(
                    field,
                    format!("The {field} field must not be greater than {MAX_STRING_LEN} characters."),
                );
                None
            } else {
                Some(v)
            }
        }
        _ => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

fn email(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    let email = required(errors, "email", value)?;
    if !is_valid_email(email) {
        errors.add("email", "The email field must be a valid email address.");
        return None;
    }
    Some(email.to_lowercase())
}

/// A city name: present, non-blank, at most 255 characters.
pub fn city(value: Option<&str>) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let city = required(&mut errors, "city", value).map(str::to_string);
    errors.into_result(city.unwrap_or_default())
}

/// Raw registration payload.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// Registration payload after validation; email is normalized to lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub fn validate(&self) -> Result<NewAccount, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = required(&mut errors, "name", self.name.as_deref()).map(str::to_string);
        let email = email(&mut errors, self.email.as_deref());

        let password = match self.password.as_deref() {
            None | Some("") => {
                errors.add("password", "The password field is required.");
                None
            }
            Some(p) if p.chars().count() < MIN_PASSWORD_LEN => {
                errors.add(
                    "password",
                    format!("The password field must be at least {MIN_PASSWORD_LEN} characters."),
                );
                None
            }
            Some(p) if self.password_confirmation.as_deref() != Some(p) => {
                errors.add("password", "The password field confirmation does not match.");
                None
            }
            Some(p) => Some(p.to_string()),
        };

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(NewAccount {
                name,
                email,
                password,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = email(&mut errors, self.email.as_deref());

        let password = match self.password.as_deref() {
            Some(p) if !p.is_empty() => Some(p.to_string()),
            _ => {
                errors.add("password", "The password field is required.");
                None
            }
        };

        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(errors),
        }
    }
}
