//! Field-by-field request validation.
//!
//! Rules are checked in order and every failure is collected, so a
//! client sees all problems with a payload in one response.

use crate::error::{ApiError, FieldError};

/// Collects validation failures for one request body.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Require a non-blank value.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, format!("{field} is required"));
        }
        self
    }

    /// Require a non-blank value whose length in characters is in `min..=max`.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, format!("{field} is required"));
            return self;
        }
        let len = value.chars().count();
        if len < min {
            self.fail(field, format!("{field} must be at least {min} characters"));
        } else if len > max {
            self.fail(field, format!("{field} must be at most {max} characters"));
        }
        self
    }

    /// Limit an optional value to `max` characters.
    pub fn max_length(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.fail(field, format!("{field} must be at most {max} characters"));
        }
        self
    }

    /// Require a syntactically valid email address.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, format!("{field} is required"));
        } else if !is_email(value) {
            self.fail(field, format!("{field} must be a valid email address"));
        }
        self
    }

    /// Finish, returning a `Validation` error if anything failed.
    pub fn finish(&mut self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

/// Shape check only: `local@domain.tld`, no whitespace, one `@`.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && !tld.is_empty() && !host.starts_with('.') && !host.ends_with('.')
        }
        None => false,
    }
}
