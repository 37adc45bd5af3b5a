use async_trait::async_trait;
use auth::Claims;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::AuthError;

/// Port for the credential lifecycle: register, login, refresh, lookup.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create a user and issue its first token pair.
    ///
    /// # Arguments
    /// * `command` - Validated username, email and password
    ///
    /// # Returns
    /// Created user with access and refresh tokens
    ///
    /// # Errors
    /// * `AlreadyExists` - Email (or username) is already registered
    /// * `Hashing` - Password hashing failed
    /// * `Signing` - Token issuance failed after the user was stored
    /// * `DatabaseError` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError>;

    /// Check email and password and issue a token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `Signing` - Token issuance failed
    /// * `DatabaseError` - Store operation failed
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError>;

    /// Exchange a refresh token for a new pair and the current user record.
    ///
    /// # Arguments
    /// * `refresh_token` - Raw token, without any `Bearer ` prefix
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token rejected for any reason, including a
    ///   user that no longer exists
    /// * `DatabaseError` - Store operation failed
    async fn refresh_token_pair(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, AuthError>;
}

/// Persistence operations for user identities.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `AlreadyExists` - Email or username violates a uniqueness constraint
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AuthError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `AlreadyExists` - New email or username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, AuthError>;
}

/// Decides whether a verified refresh token may be exchanged.
///
/// Called with the claims of the presented token before the new pair is
/// handed out. A store-backed implementation can record `jti` values to make
/// refresh tokens single-use.
#[async_trait]
pub trait RotationGuard: Send + Sync + 'static {
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token must not be exchanged
    /// * `DatabaseError` - Guard storage failed
    async fn admit(&self, refresh_claims: &Claims) -> Result<(), AuthError>;
}
