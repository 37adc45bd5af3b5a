use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use uuid::Uuid;

use super::claims::Claims;
use super::claims::TokenKind;
use super::config::TokenConfig;
use super::errors::TokenError;

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Outcome of exchanging a refresh token.
#[derive(Debug, Clone)]
pub struct Rotation {
    /// Verified claims of the refresh token that was presented
    pub previous: Claims,
    /// Claims of the newly minted access token
    pub current: Claims,
    pub tokens: TokenPair,
}

/// Issues, verifies and rotates HS256-signed token pairs.
///
/// Holds only immutable configuration, so a single instance can be shared
/// across tasks without locking.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenManager {
    /// Signing algorithm. Tokens declaring anything else are rejected.
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Create a token manager from validated configuration.
    ///
    /// # Errors
    /// * `InvalidConfig` - See [`TokenConfig::validate`]
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        config.validate()?;

        let mut validation = Validation::new(Self::ALGORITHM);
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
            issuer: config.issuer,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a fresh access/refresh pair for a user.
    ///
    /// # Errors
    /// * `Signing` - Token encoding failed
    pub fn issue_pair(&self, user_id: Uuid, email: &str) -> Result<TokenPair, TokenError> {
        self.mint(user_id, email, Utc::now())
            .map(|(_, tokens)| tokens)
    }

    /// Verify signature, algorithm, issuer and expiry of any token kind.
    ///
    /// # Errors
    /// * `Malformed` - Not a well-formed token, wrong algorithm or issuer
    /// * `InvalidSignature` - Not signed with this manager's secret
    /// * `Expired` - Current time is not strictly before `exp`
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Verify a token and require it to be of the given kind.
    ///
    /// # Errors
    /// * Any error from [`TokenManager::verify`]
    /// * `WrongKind` - Token was minted for the other purpose
    pub fn verify_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;

        if claims.token_use != kind {
            return Err(TokenError::WrongKind {
                expected: kind,
                actual: claims.token_use,
            });
        }

        Ok(claims)
    }

    /// Exchange a valid refresh token for a brand-new pair.
    ///
    /// The presented token is not recorded anywhere and stays valid until
    /// its own expiry.
    ///
    /// # Errors
    /// * Any error from [`TokenManager::verify_kind`]
    /// * `Signing` - Token encoding failed
    pub fn rotate(&self, refresh_token: &str) -> Result<Rotation, TokenError> {
        let previous = self.verify_kind(refresh_token, TokenKind::Refresh)?;
        let (current, tokens) = self.mint(previous.user_id, &previous.email, Utc::now())?;

        Ok(Rotation {
            previous,
            current,
            tokens,
        })
    }

    fn mint(
        &self,
        user_id: Uuid,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<(Claims, TokenPair), TokenError> {
        let access = Claims::new(
            user_id,
            email,
            &self.issuer,
            TokenKind::Access,
            issued_at,
            self.access_ttl,
        );
        let refresh = Claims::new(
            user_id,
            email,
            &self.issuer,
            TokenKind::Refresh,
            issued_at,
            self.refresh_ttl,
        );

        let tokens = TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        };

        Ok((access, tokens))
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Self::ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
