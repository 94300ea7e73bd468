use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::ApiError,
    repository::RepositoryState,
    roles::{self, Role},
};

/// Claims
///
/// Payload carried inside every bearer token. Signed with the server secret
/// and validated on each authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, serialized as a string per JWT convention.
    pub sub: String,
    /// Expiration time (seconds since epoch). Tokens stay valid until natural
    /// expiry; there is no rotation or blacklist.
    pub exp: usize,
    /// Issued-at time (seconds since epoch).
    pub iat: usize,
}

/// issue_token
///
/// Produces a signed, time-limited bearer credential for the given user.
pub fn issue_token(user_id: i64, ttl_minutes: i64, secret: &str) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now as usize,
        exp: (now + ttl_minutes * 60) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
}

/// hash_password
///
/// Argon2id with a fresh random salt. The PHC string embeds salt and params.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

/// verify_password
///
/// One-way comparison against a stored PHC hash. A mismatch is `Ok(false)`;
/// only a malformed stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("invalid stored hash: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::Internal(format!("failed to verify password: {e}"))),
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the capability object
/// every protected handler receives and checks its role requirements against.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// Minimum-role guard. Super admin passes unconditionally; otherwise the
    /// caller's rank must meet the requirement. Fails closed with Forbidden.
    pub fn require(&self, minimum: Role) -> Result<(), ApiError> {
        if roles::has_permission(self.role, minimum) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(minimum.denial_message().to_string()))
        }
    }

    /// Exact-top-tier guard.
    pub fn require_super_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::SuperAdmin {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                Role::SuperAdmin.denial_message().to_string(),
            ))
        }
    }
}

/// AuthUser Extractor
///
/// Axum `FromRequestParts` implementation: Bearer extraction, JWT validation,
/// then a database lookup for the user's current role (so a deleted user or a
/// changed role takes effect immediately, not at token expiry). Any failure in
/// this chain rejects with 401 Unauthorized; role checks happen later in the
/// handlers and reject with 403.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass: an `x-user-id` header names the acting
        // user directly. Guarded by the environment check and still verified
        // against the database so roles are loaded for real.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = id_str.parse::<i64>() {
                        if let Ok(Some(user)) = repo.get_user(user_id).await {
                            let role = Role::parse(&user.role).ok_or_else(|| {
                                ApiError::Internal(format!("unknown role '{}'", user.role))
                            })?;
                            return Ok(AuthUser {
                                id: user.id,
                                username: user.username,
                                role,
                            });
                        }
                    }
                }
            }
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::Unauthorized("Token has expired".into()),
                _ => ApiError::Unauthorized("Could not validate credentials".into()),
            }
        })?;

        let user_id: i64 = token_data
            .claims
            .sub
            .parse()
            .map_err(|_| ApiError::Unauthorized("Could not validate credentials".into()))?;

        // Final verification: the subject must still exist.
        let user = repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

        let role = Role::parse(&user.role)
            .ok_or_else(|| ApiError::Internal(format!("unknown role '{}'", user.role)))?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            role,
        })
    }
}
