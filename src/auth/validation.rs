//! Input validation for registration and login.
//!
//! Request bodies are deserialized with every field optional and validated
//! here, so a missing field and a malformed one both surface as field-level
//! messages rather than a parse failure.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::db::Role;

const USERNAME_REQUIRED: &str = "Username is required";
const PASSWORD_REQUIRED: &str = "Password is required";
const ROLE_REQUIRED: &str = "Role is required";
const ROLE_UNKNOWN: &str = "Role must be one of: admin, manager, user";

/// Field-level validation failure.
#[derive(Error, Debug, Clone)]
#[error("validation failed")]
pub struct ValidationError(pub ValidationErrors);

impl ValidationError {
    /// Messages grouped by field name.
    pub fn field_messages(&self) -> HashMap<String, Vec<String>> {
        self.0
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value for {}", field))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect()
    }
}

fn field_error(code: &'static str, message: &'static str) -> validator::ValidationError {
    validator::ValidationError::new(code).with_message(message.into())
}

fn into_result(errors: ValidationErrors) -> Result<(), ValidationError> {
    if errors.field_errors().is_empty() {
        Ok(())
    } else {
        Err(ValidationError(errors))
    }
}

/// Registration request body.
#[derive(Deserialize, Validate, Default, Clone)]
pub struct RegistrationRequest {
    /// Desired username.
    #[validate(
        required(message = "Username is required"),
        length(min = 4, max = 30, message = "Username must be 4-30 characters long")
    )]
    pub username: Option<String>,
    /// Plaintext password.
    #[validate(
        required(message = "Password is required"),
        length(min = 5, message = "Password must be at least 5 characters")
    )]
    pub password: Option<String>,
    /// Requested role.
    #[validate(required(message = "Role is required"))]
    pub role: Option<String>,
}

impl RegistrationRequest {
    /// Build a request with every field present.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            role: Some(role.into()),
        }
    }

    /// Trim and validate, producing a typed registration.
    pub fn into_registration(self) -> Result<Registration, ValidationError> {
        let request = Self {
            username: self.username.map(|u| u.trim().to_string()),
            ..self
        };

        let validated = request.validate().err().unwrap_or_else(ValidationErrors::new);

        // An empty value is both missing and too short
        let mut errors = ValidationErrors::new();
        for (field, value, message) in [
            ("username", &request.username, USERNAME_REQUIRED),
            ("password", &request.password, PASSWORD_REQUIRED),
        ] {
            if value.as_deref() == Some("") {
                errors.add(field, field_error("required", message));
            }
        }
        for (field, field_errors) in validated.field_errors() {
            for error in field_errors {
                errors.add(field, error.clone());
            }
        }

        let role = match request.role.as_deref() {
            Some("") => {
                errors.add("role", field_error("required", ROLE_REQUIRED));
                None
            }
            Some(value) => match value.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    errors.add("role", field_error("role", ROLE_UNKNOWN));
                    None
                }
            },
            None => None,
        };

        into_result(errors)?;

        match (request.username, request.password, role) {
            (Some(username), Some(password), Some(role)) => Ok(Registration {
                username,
                password,
                role,
            }),
            _ => Err(ValidationError(ValidationErrors::new())),
        }
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish()
    }
}

/// Login request body.
#[derive(Deserialize, Validate, Default, Clone)]
pub struct LoginRequest {
    /// Username.
    #[validate(
        required(message = "Username is required"),
        length(min = 1, message = "Username is required")
    )]
    pub username: Option<String>,
    /// Plaintext password.
    #[validate(
        required(message = "Password is required"),
        length(min = 1, message = "Password is required")
    )]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Build a request with both fields present.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    /// Trim and validate, producing login credentials.
    pub fn into_credentials(self) -> Result<Credentials, ValidationError> {
        let request = Self {
            username: self.username.map(|u| u.trim().to_string()),
            ..self
        };

        request.validate().map_err(ValidationError)?;

        match (request.username, request.password) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            _ => Err(ValidationError(ValidationErrors::new())),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A validated registration.
#[derive(Clone)]
pub struct Registration {
    /// Trimmed username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Requested role.
    pub role: Role,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Validated login credentials.
#[derive(Clone)]
pub struct Credentials {
    /// Trimmed username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
