use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Password must not be empty")]
    EmptyInput,

    #[error("Invalid password hashing policy: {0}")]
    InvalidPolicy(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}
