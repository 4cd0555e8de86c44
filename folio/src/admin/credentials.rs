//! Admin credential check.
//!
//! There is exactly one admin account, configured at startup. The password
//! is compared as plain text: the account never lives in the database and
//! there is nothing to hash against.

use crate::config::AdminConfig;
use std::fmt;

/// The configured admin account. Fixed for the life of the process.
#[derive(Clone, Default)]
pub struct AdminIdentity {
    username: Option<String>,
    password: Option<String>,
}

impl fmt::Debug for AdminIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminIdentity")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl AdminIdentity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()).filter(|v| !v.is_empty()),
            password: Some(password.into()).filter(|v| !v.is_empty()),
        }
    }

    /// Read the identity from configuration. Empty strings count as unset.
    pub fn from_config(config: &AdminConfig) -> Self {
        Self {
            username: non_empty(&config.username),
            password: non_empty(&config.password),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// Compares submitted credentials with the [`AdminIdentity`].
#[derive(Debug, Clone)]
pub struct CredentialChecker {
    identity: AdminIdentity,
}

impl CredentialChecker {
    pub fn new(identity: AdminIdentity) -> Self {
        Self { identity }
    }

    pub fn is_configured(&self) -> bool {
        self.configuration_error().is_none()
    }

    /// Which part of the identity is missing. For server logs only.
    pub fn configuration_error(&self) -> Option<&'static str> {
        match (&self.identity.username, &self.identity.password) {
            (None, None) => Some("admin username and password are not configured"),
            (None, Some(_)) => Some("admin username is not configured"),
            (Some(_), None) => Some("admin password is not configured"),
            (Some(_), Some(_)) => None,
        }
    }

    /// True iff both values match the configured identity.
    ///
    /// Always false when the identity is incomplete.
    pub fn check(&self, username: &str, password: &str) -> bool {
        match (&self.identity.username, &self.identity.password) {
            (Some(expected_user), Some(expected_pass)) => {
                username == expected_user && password == expected_pass
            }
            _ => false,
        }
    }
}
