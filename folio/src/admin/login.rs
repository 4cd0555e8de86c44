//! Admin login: input validation, credential check, token issue.

use crate::admin::credentials::CredentialChecker;
use crate::admin::token::{TokenError, TokenService};
use crate::error::FieldError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

/// Login request body. Fields are optional so a missing value is reported
/// as a validation error rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("username and password are required")]
    Validation(Vec<FieldError>),

    #[error("login body is not valid JSON credentials")]
    InvalidInput,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("admin identity is not configured: {0}")]
    Misconfigured(&'static str),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub struct LoginFlow {
    checker: CredentialChecker,
    tokens: TokenService,
}

fn required<'a>(
    value: &'a Option<String>,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> &'a str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => {
            errors.push(FieldError::new(field, message));
            ""
        }
    }
}

impl LoginFlow {
    pub fn new(checker: CredentialChecker, tokens: TokenService) -> Self {
        Self { checker, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn checker(&self) -> &CredentialChecker {
        &self.checker
    }

    pub fn login(&self, request: &LoginRequest) -> Result<String, LoginError> {
        self.login_at(request, Utc::now())
    }

    /// Run the login and return a signed session token.
    pub fn login_at(&self, request: &LoginRequest, now: DateTime<Utc>) -> Result<String, LoginError> {
        let mut errors = Vec::new();
        let username = required(
            &request.username,
            "username",
            "Username is required.",
            &mut errors,
        );
        let password = required(
            &request.password,
            "password",
            "Password is required.",
            &mut errors,
        );
        if !errors.is_empty() {
            return Err(LoginError::Validation(errors));
        }

        if let Some(reason) = self.checker.configuration_error() {
            error!(reason, "Admin login attempted but admin identity is incomplete");
            return Err(LoginError::Misconfigured(reason));
        }

        if !self.checker.check(username, password) {
            warn!(username, "Rejected admin login");
            return Err(LoginError::InvalidCredentials);
        }

        let token = self.tokens.issue_at(username, now)?;
        info!(username, "Admin logged in");
        Ok(token)
    }
}
