use std::fmt;

use chrono::Duration;

use super::errors::TokenError;

/// Minimum HS256 key length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Claims carry whole-second timestamps, so shorter lifetimes would mint
/// tokens that are expired on issue.
fn min_ttl() -> Duration {
    Duration::seconds(1)
}

/// Signing parameters fixed for the lifetime of a [`TokenManager`].
///
/// [`TokenManager`]: super::TokenManager
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
    pub issuer: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(
        secret: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Check the configuration before any token is signed with it.
    ///
    /// # Errors
    /// * `InvalidConfig` - Secret too short, empty issuer, or lifetime under one second
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::InvalidConfig(format!(
                "secret must be at least {} bytes, got {}",
                MIN_SECRET_LENGTH,
                self.secret.len()
            )));
        }

        if self.issuer.trim().is_empty() {
            return Err(TokenError::InvalidConfig("issuer must not be empty".to_string()));
        }

        if self.access_ttl < min_ttl() {
            return Err(TokenError::InvalidConfig(
                "access token lifetime must be at least one second".to_string(),
            ));
        }

        if self.refresh_ttl < min_ttl() {
            return Err(TokenError::InvalidConfig(
                "refresh token lifetime must be at least one second".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}
