use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;
use super::policy::PasswordPolicy;

/// Fixed salt for decoy computations (base64 of "decoy-salt-bytes").
const DECOY_SALT: &str = "ZGVjb3ktc2FsdC1ieXRlcw";

/// Password hashing implementation.
///
/// New records are Argon2id PHC strings produced under the configured
/// [`PasswordPolicy`]. Verification also accepts bcrypt records written by
/// the previous generation of the user store.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    policy: PasswordPolicy,
    params: Params,
}

impl PasswordHasher {
    /// Create a password hasher with the default policy.
    pub fn new() -> Self {
        Self {
            policy: PasswordPolicy::default(),
            params: Params::default(),
        }
    }

    /// Create a password hasher with an explicit work factor.
    ///
    /// # Errors
    /// * `InvalidPolicy` - Argon2 rejected the parameters
    pub fn with_policy(policy: PasswordPolicy) -> Result<Self, PasswordError> {
        let params = policy.params()?;
        Ok(Self { policy, params })
    }

    /// Policy applied to new hashes.
    pub fn policy(&self) -> PasswordPolicy {
        self.policy
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `EmptyInput` - Password is empty
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyInput);
        }

        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// The salt and parameters come from the stored record; the final
    /// comparison is constant-time. Malformed records verify as `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if is_bcrypt(hash) {
            return bcrypt::verify(password, hash).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Unreadable bcrypt password record");
                false
            });
        }

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "Unreadable password record");
                return false;
            }
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend the cost of one hash without a stored record.
    ///
    /// Used when the account does not exist so that the response time does
    /// not reveal it.
    pub fn verify_decoy(&self, password: &str) {
        if let Ok(salt) = SaltString::from_b64(DECOY_SALT) {
            let _ = self.argon2().hash_password(password.as_bytes(), &salt);
        }
    }

    /// Whether a stored record should be re-hashed under the current policy.
    ///
    /// True for bcrypt records and Argon2 records with different parameters.
    /// Unreadable records are left alone.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        if is_bcrypt(hash) {
            return true;
        }

        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        if parsed_hash.algorithm != argon2::ARGON2ID_IDENT {
            return true;
        }

        match Params::try_from(&parsed_hash) {
            Ok(params) => !self.policy.matches(&params),
            Err(_) => false,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn is_bcrypt(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}
