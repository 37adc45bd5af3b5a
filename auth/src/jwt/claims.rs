use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Purpose a token was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, presented on every protected request
    Access,
    /// Long-lived, only exchanged for a new pair
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// Payload signed into every access and refresh token.
///
/// Claims are never mutated after signing; rotation builds a new set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User identifier
    pub user_id: Uuid,

    /// Email of the user at issuance
    pub email: String,

    /// Issuer
    pub iss: String,

    /// Subject (string form of `user_id`)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: Uuid,

    /// Access or refresh
    pub token_use: TokenKind,
}

impl Claims {
    /// Build claims for a user, expiring `ttl` after `issued_at`.
    pub fn new(
        user_id: Uuid,
        email: impl Into<String>,
        issuer: impl Into<String>,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let iat = issued_at.timestamp();

        Self {
            user_id,
            email: email.into(),
            iss: issuer.into(),
            sub: user_id.to_string(),
            iat,
            // Whole seconds, so `exp - iat` never rounds below the lifetime
            exp: iat + ttl.num_seconds(),
            jti: Uuid::new_v4(),
            token_use: kind,
        }
    }

    /// Check if the token is expired.
    ///
    /// A token is valid only while the current time is strictly before `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
