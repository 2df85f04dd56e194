use serde::Deserialize;
use std::fmt;

/// Expected length of the API key.
pub const KEY_LENGTH: usize = 40;
/// Expected length of the API token.
pub const TOKEN_LENGTH: usize = 32;

/// Moip API key/token pair.
///
/// Only used to authenticate HTTP calls; it never appears in the instruction
/// document.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    key: String,
    token: String,
}

impl Credential {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether key and token have the lengths Moip issues.
    pub fn is_well_formed(&self) -> bool {
        self.key.chars().count() == KEY_LENGTH && self.token.chars().count() == TOKEN_LENGTH
    }

    /// Authorization value in `token:key` form.
    pub fn authorization(&self) -> String {
        format!("{}:{}", self.token, self.key)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
