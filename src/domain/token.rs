//! Opaque capability tokens.
//!
//! A [`Token`] grants either the right to join a game as the second
//! player or the right to watch it. Tokens are random, URL-safe strings
//! with no structure a client may rely on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, unguessable session access token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Generates a fresh random token (122 bits of entropy from a UUID v4,
    /// rendered as 32 lowercase hex characters).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn generate_is_unique() {
        assert_ne!(Token::generate(), Token::generate());
    }

    #[test]
    fn generated_token_is_url_safe() {
        let token = Token::generate();
        assert_eq!(token.as_str().len(), 32);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let token = Token::from("abc123");
        let json = serde_json::to_string(&token).unwrap_or_default();
        assert_eq!(json, "\"abc123\"");
    }
}
