//! Bearer-token extractor and password hashing.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use quill_core::{store::BlogStore, user::Identity};
use rand_core::OsRng;

use crate::{ApiState, error::ApiError};

/// Hash a plaintext password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

/// An authenticated caller. Present in a handler means the request carried a
/// live session token.
#[derive(Debug, Clone)]
pub struct Caller {
  pub identity: Identity,
  /// The raw token presented, kept so logout can revoke it.
  pub token:    String,
}

impl<S> FromRequestParts<ApiState<S>> for Caller
where
  S: BlogStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or(quill_core::Error::InvalidSession)?
      .to_owned();

    let identity = state
      .store
      .resolve_session(token.clone())
      .await
      .map_err(ApiError::store)?
      .ok_or(quill_core::Error::InvalidSession)?;

    Ok(Caller { identity, token })
  }
}
