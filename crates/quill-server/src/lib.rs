//! HTTP server assembly for Quill.
//!
//! Mounts [`quill_api::api_router`] under `/api` with request tracing and an
//! allow-all CORS policy, and provides the startup helpers used by the binary.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use quill_core::{store::BlogStore, user::Role};
use serde::Deserialize;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `QUILL_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub session_ttl_hours: i64,
  /// Usernames granted the admin role at startup.
  pub admins:            Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_string(),
      port:              6000,
      store_path:        PathBuf::from("quill.db"),
      session_ttl_hours: 72,
      admins:            Vec::new(),
    }
  }
}

/// Ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Session lifetime, clamped to between an hour and
  /// [`MAX_SESSION_TTL_HOURS`].
  pub fn session_ttl(&self) -> chrono::Duration {
    let hours = self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS);
    if hours != self.session_ttl_hours {
      tracing::warn!(
        configured = self.session_ttl_hours,
        used = hours,
        "session_ttl_hours out of range"
      );
    }
    chrono::Duration::hours(hours)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: BlogStore + 'static,
{
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  Router::new()
    .nest("/api", quill_api::api_router(store, config.session_ttl()))
    .layer(TraceLayer::new_for_http())
    .layer(cors)
}

// ─── Startup ──────────────────────────────────────────────────────────────────

/// Grant the admin role to each configured username that exists.
pub async fn promote_admins<S>(store: &S, admins: &[String]) -> Result<(), S::Error>
where
  S: BlogStore,
{
  for username in admins {
    if store.set_role(username.clone(), Role::Admin).await? {
      tracing::info!(%username, "granted admin role");
    } else {
      tracing::warn!(%username, "configured admin does not exist yet");
    }
  }
  Ok(())
}
