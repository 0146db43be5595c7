//! Secret string type for safe token handling.
//!
//! Provides a wrapper type that prevents accidental logging of sensitive values.

use serde::Deserialize;
use std::fmt;

/// A wrapper for secrets that prevents accidental logging.
///
/// `SecretString` keeps the GitLab access token out of debug output, logs
/// and error messages.
///
/// # Features
/// - `Debug` and `Display` implementations show `[REDACTED]` instead of the value
/// - Explicit `expose_secret()` method required to access the actual value
/// - Clears memory on drop (best-effort, not cryptographically secure)
///
/// # Example
/// ```ignore
/// let token = SecretString::new("my-secret-token");
///
/// // Debug output shows [REDACTED]
/// println!("{:?}", token);  // Output: [REDACTED]
///
/// // Explicit access required
/// let value = token.expose_secret();
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Explicitly expose the secret value.
    ///
    /// Use this method only when the secret value is actually needed,
    /// such as when constructing authentication headers.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl SecretString {
    /// Whether the secret is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Best-effort clearing only; copies may exist elsewhere.
        self.0.clear();
        self.0.shrink_to_fit();
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}
