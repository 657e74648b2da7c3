/// Shared JWT issuing and validation for the SSO service
///
/// Tokens are signed with HS256 (HMAC with SHA-256) using a single
/// process-wide secret supplied at startup.
///
/// ## Security Design
///
/// - **HS256 only**: validation pins the algorithm, so a token signed with any
///   other algorithm is rejected
/// - **No hardcoded keys**: the secret is injected by the caller
/// - **Fail-fast**: an empty secret is rejected at construction, never at first use
/// - **Thread-safe**: keys are immutable after construction and `JwtIssuer` is `Clone`
///
/// ## Usage
///
/// ```rust
/// use crypto_core::jwt::JwtIssuer;
/// use std::time::Duration;
///
/// let issuer = JwtIssuer::new("super-secret").expect("secret must be set");
/// let token = issuer.issue(1, "a@x.com", Duration::from_secs(3600)).unwrap();
/// let claims = issuer.verify(&token).unwrap();
/// assert_eq!(claims.uid, 1);
/// ```
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// JWT algorithm used for every token this service signs
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject user ID
    pub uid: i64,
    /// Subject email, as stored
    pub email: String,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("signing secret is missing or empty")]
    SigningUnavailable,

    #[error("token expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

pub type Result<T> = std::result::Result<T, JwtError>;

// ============================================================================
// Issuer
// ============================================================================

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Signs and validates HS256 tokens with a fixed secret
#[derive(Clone)]
pub struct JwtIssuer {
    keys: Arc<Keys>,
}

impl fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("algorithm", &JWT_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl JwtIssuer {
    /// Build an issuer from the process signing secret
    ///
    /// ## Errors
    ///
    /// Returns `JwtError::SigningUnavailable` if the secret is empty or only
    /// whitespace. Callers should treat this as a startup failure.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(JwtError::SigningUnavailable);
        }

        let bytes = secret.as_bytes();
        Ok(Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(bytes),
                decoding: DecodingKey::from_secret(bytes),
            }),
        })
    }

    /// Issue a token for `user_id` / `email` that expires `ttl` from now
    ///
    /// `exp` saturates at `i64::MAX` for TTLs too large to represent.
    pub fn issue(&self, user_id: i64, email: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);

        let claims = Claims {
            uid: user_id,
            email: email.to_string(),
            exp: now.saturating_add(ttl_secs),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(JWT_ALGORITHM), claims, &self.keys.encoding)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Validate a token and return its claims
    ///
    /// ## Errors
    ///
    /// - `JwtError::Expired` once `exp` is reached (a token is valid strictly before it)
    /// - `JwtError::InvalidSignature` if the token was signed with another secret
    /// - `JwtError::Malformed` for anything that does not decode as a token
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        // jsonwebtoken only rejects `exp < now`; this makes it `exp <= now`
        validation.reject_tokens_expiring_in_less_than = 1;

        decode::<Claims>(token, &self.keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
