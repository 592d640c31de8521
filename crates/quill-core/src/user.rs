//! Users and the identity resolved from a session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub type UserId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  User,
  Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:            UserId,
  pub username:      String,
  /// argon2 PHC string. Never serialized.
  #[serde(skip)]
  pub password_hash: String,
  pub nickname:      String,
  pub email:         String,
  pub avatar:        String,
  pub role:          Role,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Who is making an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
  pub user_id:  UserId,
  pub username: String,
  pub role:     Role,
}

/// Input to [`crate::store::BlogStore::create_user`]. The password arrives
/// already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
  pub email:         String,
}

/// Partial profile update; empty strings leave the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  pub nickname: Option<String>,
  pub avatar:   Option<String>,
  pub email:    Option<String>,
}

impl UserPatch {
  pub fn without_blanks(self) -> Self {
    fn keep(s: Option<String>) -> Option<String> {
      s.filter(|s| !s.is_empty())
    }
    Self {
      nickname: keep(self.nickname),
      avatar:   keep(self.avatar),
      email:    keep(self.email),
    }
  }
}

/// Check the plaintext registration fields before hashing anything.
pub fn validate_registration(username: &str, password: &str, email: &str) -> Result<()> {
  if username.trim().is_empty() {
    return Err(Error::MissingField("username"));
  }
  if password.is_empty() {
    return Err(Error::MissingField("password"));
  }
  if email.trim().is_empty() {
    return Err(Error::MissingField("email"));
  }
  Ok(())
}
