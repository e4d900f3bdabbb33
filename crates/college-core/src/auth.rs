//! Roles and bearer token verification.
//!
//! Tokens are HS256 JWTs signed with the server secret and handled by
//! `jsonwebtoken`. The payload carries [`Claims`]: the user id, the role,
//! and an expiry.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "faculty" => Ok(Role::Faculty),
            "student" => Ok(Role::Student),
            other => Err(Error::InvalidInput(format!(
                "unknown role '{}', expected admin, faculty, or student",
                other
            ))),
        }
    }
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: Role,
    /// Expiry, unix seconds.
    pub exp: i64,
    /// Issued-at, unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
    pub name: Option<String>,
}

impl AuthUser {
    /// Fail with `Forbidden` unless the user holds `role`.
    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.role != role {
            return Err(Error::Forbidden(format!(
                "{} role required, caller has {}",
                role, self.role
            )));
        }
        Ok(())
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            name: claims.name,
        }
    }
}

/// Signs and verifies HS256 bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(Error::Config("token secret must not be empty".to_string()));
        }

        // Expiry is checked against an explicit clock in `verify_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Produce a signed token for `claims`.
    pub fn issue(&self, claims: &Claims) -> Result<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("token signing failed: {}", e)))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature, algorithm, and expiry (`exp` must be after `now`).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(rejection)?
            .claims;

        if claims.exp <= now {
            return Err(Error::Unauthorized("token expired".to_string()));
        }
        Ok(claims)
    }
}

fn rejection(err: jsonwebtoken::errors::Error) -> Error {
    let message = match err.kind() {
        ErrorKind::InvalidSignature => "invalid token signature".to_string(),
        ErrorKind::InvalidAlgorithm => "unsupported token algorithm".to_string(),
        ErrorKind::ExpiredSignature => "token expired".to_string(),
        ErrorKind::Json(e) => format!("malformed token content: {}", e),
        _ => "malformed token".to_string(),
    };
    Error::Unauthorized(message)
}
