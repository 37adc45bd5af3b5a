use std::sync::Arc;

use async_trait::async_trait;
use auth::Claims;
use auth::PasswordHasher;
use auth::TokenManager;
use auth::TokenPair;
use chrono::DateTime;
use chrono::SubsecRound;
use chrono::Utc;
use tokio::sync::Semaphore;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::RotationGuard;
use crate::user::ports::UserRepository;

/// Current time at the precision the user store keeps (microseconds).
fn store_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Rotation guard that admits every verified refresh token.
///
/// Refresh tokens therefore stay usable until they expire, even after they
/// have been exchanged once.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatelessRotation;

#[async_trait]
impl RotationGuard for StatelessRotation {
    async fn admit(&self, _refresh_claims: &Claims) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Domain service implementation for the credential lifecycle.
///
/// Concrete implementation of AuthServicePort with dependency injection.
pub struct AuthService<UR, RG>
where
    UR: UserRepository,
    RG: RotationGuard,
{
    repository: Arc<UR>,
    rotation_guard: Arc<RG>,
    token_manager: Arc<TokenManager>,
    password_hasher: Arc<PasswordHasher>,
    hashing_permits: Option<Arc<Semaphore>>,
}

impl<UR, RG> AuthService<UR, RG>
where
    UR: UserRepository,
    RG: RotationGuard,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `rotation_guard` - Policy applied to presented refresh tokens
    /// * `token_manager` - Shared token issuer/verifier
    /// * `password_hasher` - Hasher configured with the password policy
    pub fn new(
        repository: Arc<UR>,
        rotation_guard: Arc<RG>,
        token_manager: Arc<TokenManager>,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            rotation_guard,
            token_manager,
            password_hasher: Arc::new(password_hasher),
            hashing_permits: None,
        }
    }

    /// Bound the number of password hashes computed at once.
    ///
    /// `0` leaves hashing unbounded.
    pub fn with_hashing_limit(mut self, max_concurrent_hashes: usize) -> Self {
        self.hashing_permits = match max_concurrent_hashes {
            0 => None,
            limit => Some(Arc::new(Semaphore::new(limit))),
        };
        self
    }

    /// Run a CPU-heavy hasher call on the blocking pool.
    async fn with_hasher<T, F>(&self, job: F) -> Result<T, AuthError>
    where
        F: FnOnce(&PasswordHasher) -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = match &self.hashing_permits {
            Some(permits) => Some(
                Arc::clone(permits)
                    .acquire_owned()
                    .await
                    .map_err(|e| AuthError::Hashing(e.to_string()))?,
            ),
            None => None,
        };

        let hasher = Arc::clone(&self.password_hasher);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job(&hasher)
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        self.token_manager
            .issue_pair(user.id.0, user.email.as_str())
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Token issuance failed");
                AuthError::from(e)
            })
    }

    /// Store a hash under the current policy. Failures keep the old record.
    async fn upgrade_password_hash(&self, user: User, password: String) -> User {
        let password_hash = match self.with_hasher(move |hasher| hasher.hash(&password)).await {
            Ok(Ok(hash)) => hash,
            Ok(Err(e)) => {
                tracing::warn!(user_id = %user.id, error = %e, "Password rehash failed");
                return user;
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Password rehash failed");
                return user;
            }
        };

        let mut upgraded = user.clone();
        upgraded.password_hash = password_hash;
        upgraded.updated_at = store_now();

        match self.repository.update(upgraded).await {
            Ok(updated) => {
                tracing::info!(user_id = %updated.id, "Password hash upgraded");
                updated
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to store upgraded password hash");
                user
            }
        }
    }
}

#[async_trait]
impl<UR, RG> AuthServicePort for AuthService<UR, RG>
where
    UR: UserRepository,
    RG: RotationGuard,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            tracing::debug!("Registration rejected: email already registered");
            return Err(AuthError::AlreadyExists(command.email.to_string()));
        }

        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            tracing::debug!("Registration rejected: username already taken");
            return Err(AuthError::AlreadyExists(command.username.to_string()));
        }

        let password = command.password;
        let password_hash = self
            .with_hasher(move |hasher| hasher.hash(password.expose()))
            .await??;

        let now = store_now();
        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        // Tokens are only minted once the identity is stored
        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        let tokens = self.issue_tokens(&created_user)?;

        Ok(AuthSession {
            user: created_user,
            tokens,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError> {
        let LoginCommand { email, password } = command;

        let Some(user) = self.repository.find_by_email(&email).await? else {
            self.with_hasher(move |hasher| hasher.verify_decoy(&password))
                .await?;
            tracing::debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let candidate = password.clone();
        let stored_hash = user.password_hash.clone();
        let (is_valid, needs_rehash) = self
            .with_hasher(move |hasher| {
                let is_valid = hasher.verify(&candidate, &stored_hash);
                (is_valid, is_valid && hasher.needs_rehash(&stored_hash))
            })
            .await?;

        if !is_valid {
            tracing::debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let user = if needs_rehash {
            self.upgrade_password_hash(user, password).await
        } else {
            user
        };

        let tokens = self.issue_tokens(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthSession { user, tokens })
    }

    async fn refresh_token_pair(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let rotation = self.token_manager.rotate(refresh_token).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected");
            AuthError::from(e)
        })?;

        self.rotation_guard.admit(&rotation.previous).await?;

        // Serve the current record, not the snapshot carried by the token
        let user_id = UserId(rotation.current.user_id);
        let user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| {
                // Same answer as any other unusable refresh token
                tracing::warn!(user_id = %user_id, "Refresh token for missing user");
                AuthError::InvalidOrExpiredToken
            })?;

        Ok(AuthSession {
            user,
            tokens: rotation.tokens,
        })
    }

    async fn get_user(&self, id: &UserId) -> Result<User, AuthError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AuthError::NotFound(id.to_string()))
    }
}
