//! Client-side form validation
//!
//! Runs before any request is dispatched; each failing field gets one message.

use std::fmt;

use crate::auth::tokens::{LoginCredentials, SignupCredentials};
use crate::errors::LinkdashError;
use crate::models::ContactForm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors of one form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<FieldErrors> for LinkdashError {
    fn from(errors: FieldErrors) -> Self {
        LinkdashError::validation(errors.to_string())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email) {
        errors.push("email", "Please enter a valid email address");
    }
}

fn check_min(errors: &mut FieldErrors, field: &'static str, label: &str, value: &str, min: usize) {
    if value.trim().chars().count() < min {
        errors.push(field, format!("{} must be at least {} characters", label, min));
    }
}

pub fn validate_login(creds: &LoginCredentials) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, &creds.email);
    if creds.password.chars().count() < 6 {
        errors.push("password", "Password must be at least 6 characters");
    }
    errors.into_result()
}

pub fn validate_signup(creds: &SignupCredentials, confirm_password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if let Some(name) = creds.name.as_deref().filter(|n| !n.is_empty()) {
        check_min(&mut errors, "name", "Name", name, 2);
    }
    check_email(&mut errors, &creds.email);
    if creds.password.chars().count() < 8 {
        errors.push("password", "Password must be at least 8 characters");
    }
    if creds.password != confirm_password {
        errors.push("confirmPassword", "Passwords do not match");
    }
    errors.into_result()
}

pub fn validate_contact(form: &ContactForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_min(&mut errors, "fullName", "Name", &form.full_name, 2);
    check_email(&mut errors, &form.email);
    check_min(&mut errors, "subject", "Subject", &form.subject, 5);
    check_min(&mut errors, "message", "Message", &form.message, 10);
    errors.into_result()
}
