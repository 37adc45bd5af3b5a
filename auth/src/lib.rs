//! Credential primitives for the authentication service
//!
//! Provides the stateless building blocks of the credential lifecycle:
//! - Password hashing (Argon2id, with bcrypt verification for legacy records)
//! - Signed access/refresh token pairs (HS256): issuance, verification, rotation
//!
//! Both types hold only immutable configuration and can be shared freely
//! between request handlers.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{TokenConfig, TokenKind, TokenManager};
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! let manager = TokenManager::new(TokenConfig::new(
//!     b"secret_key_at_least_32_bytes_long!".to_vec(),
//!     "artisan",
//!     Duration::hours(1),
//!     Duration::days(7),
//! ))
//! .unwrap();
//!
//! let user_id = Uuid::new_v4();
//! let pair = manager.issue_pair(user_id, "alice@example.com").unwrap();
//!
//! let claims = manager.verify_kind(&pair.access_token, TokenKind::Access).unwrap();
//! assert_eq!(claims.user_id, user_id);
//!
//! // Exchange the refresh token for a new pair
//! let rotation = manager.rotate(&pair.refresh_token).unwrap();
//! assert_eq!(rotation.current.email, "alice@example.com");
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::Rotation;
pub use jwt::TokenConfig;
pub use jwt::TokenError;
pub use jwt::TokenKind;
pub use jwt::TokenManager;
pub use jwt::TokenPair;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
