//! JWT token generation and validation.
//!
//! Access tokens are short-lived HS256 JWTs carrying the user id, role
//! and tenant scope. Refresh tokens are opaque random values stored
//! hashed in `user_sessions` and rotated on every use.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use clarity_core::hashing::sha256_hex;
use clarity_core::DbId;

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// Role name at issuance time (`admin`, `manager`, `employee`).
    pub role: String,
    /// Company the user belongs to. `None` for platform admins.
    pub company_id: Option<DbId>,
    /// Expiry (unix seconds).
    pub exp: i64,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Token id, unique per issued token.
    pub jti: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// JWT signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes.
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days.
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `JWT_SECRET` | required, must be non-empty |
    /// | `JWT_ACCESS_EXPIRY_MINS` | `15` |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | `7` |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset or empty. The server must never
    /// start with a guessable signing key.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        if secret.is_empty() {
            panic!("JWT_SECRET must not be empty");
        }
        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");
        let refresh_token_expiry_days = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }
}

// ---------------------------------------------------------------------------
// Token operations
// ---------------------------------------------------------------------------

/// Generate a signed access token for a user.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    company_id: Option<DbId>,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        company_id,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::minutes(config.access_token_expiry_mins)).timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a token and return its claims.
///
/// Rejects tokens with a bad signature or a past `exp`.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Generate a fresh refresh token.
///
/// Returns `(plaintext, hash)`. Only the hash is persisted; the
/// plaintext goes to the client exactly once.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = uuid::Uuid::new_v4().to_string();
    let hash = sha256_hex(plaintext.as_bytes());
    (plaintext, hash)
}

/// Hash a refresh token for storage or lookup.
pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
