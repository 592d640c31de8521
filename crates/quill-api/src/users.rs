//! Handlers for account and session endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: `{"username","password","email"}`; 409 if taken |
//! | `POST` | `/auth/login` | Body: `{"username","password"}`; 401 on bad credentials |
//! | `POST` | `/auth/logout` | Revokes the presented token |
//! | `GET`  | `/user/info` | The caller's profile |
//! | `PUT`  | `/user/info` | Body: `{"nickname"?,"avatar"?,"email"?}` |
//! | `PUT`  | `/user/password` | Body: `{"oldPassword","newPassword"}` |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use quill_core::{
  store::BlogStore,
  user::{NewUser, User, UserPatch, validate_registration},
};
use serde::{Deserialize, Serialize};

use crate::{
  ApiState,
  auth::{Caller, hash_password, verify_password},
  error::ApiError,
  extract::JsonBody,
};

/// Returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
  pub token: String,
  pub user:  User,
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterBody {
  pub username: String,
  pub password: String,
  pub email:    String,
}

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BlogStore,
{
  validate_registration(&body.username, &body.password, &body.email)?;

  let user = state
    .store
    .create_user(NewUser {
      username:      body.username.trim().to_owned(),
      password_hash: hash_password(&body.password)?,
      email:         body.email.trim().to_owned(),
    })
    .await
    .map_err(ApiError::store)?;

  let token = state
    .store
    .create_session(user.id, state.session_ttl)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = user.id, username = %user.username, "user registered");
  Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

// ─── Login / logout ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: BlogStore,
{
  let user = state
    .store
    .user_by_username(body.username.trim().to_owned())
    .await
    .map_err(ApiError::store)?
    .filter(|u| verify_password(&body.password, &u.password_hash))
    .ok_or(quill_core::Error::InvalidCredentials)?;

  let token = state
    .store
    .create_session(user.id, state.session_ttl)
    .await
    .map_err(ApiError::store)?;

  tracing::debug!(user_id = user.id, "session opened");
  Ok(Json(AuthResponse { token, user }))
}

/// `POST /auth/logout`
pub async fn logout<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  state
    .store
    .revoke_session(caller.token)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Profile ──────────────────────────────────────────────────────────────────

/// `GET /user/info`
pub async fn profile<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
) -> Result<Json<User>, ApiError>
where
  S: BlogStore,
{
  let id = caller.identity.user_id;
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(quill_core::Error::UserNotFound(id))?;
  Ok(Json(user))
}

/// `PUT /user/info`
pub async fn update_profile<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
  JsonBody(patch): JsonBody<UserPatch>,
) -> Result<Json<User>, ApiError>
where
  S: BlogStore,
{
  let user = state
    .store
    .update_user(caller.identity.user_id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PasswordBody {
  pub old_password: String,
  pub new_password: String,
}

/// `PUT /user/password`
pub async fn change_password<S>(
  State(state): State<ApiState<S>>,
  caller: Caller,
  JsonBody(body): JsonBody<PasswordBody>,
) -> Result<StatusCode, ApiError>
where
  S: BlogStore,
{
  if body.new_password.is_empty() {
    return Err(quill_core::Error::MissingField("newPassword").into());
  }

  let id = caller.identity.user_id;
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(quill_core::Error::UserNotFound(id))?;

  if !verify_password(&body.old_password, &user.password_hash) {
    return Err(quill_core::Error::InvalidCredentials.into());
  }

  state
    .store
    .set_password_hash(id, hash_password(&body.new_password)?)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = id, "password changed");
  Ok(StatusCode::NO_CONTENT)
}
