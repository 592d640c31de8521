//! JSON REST API for Quill.
//!
//! Exposes an axum [`Router`] backed by any [`quill_core::store::BlogStore`].
//! TLS, CORS and request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", quill_api::api_router(store.clone(), session_ttl))
//! ```

pub mod articles;
pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod taxonomy;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use chrono::Duration;
use quill_core::store::BlogStore;

pub use auth::Caller;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:       Arc<S>,
  /// Lifetime of bearer tokens issued at login and registration.
  pub session_ttl: Duration,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      session_ttl: self.session_ttl,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, session_ttl: Duration) -> Router<()>
where
  S: BlogStore + 'static,
{
  let state = ApiState { store, session_ttl };

  Router::new()
    // Accounts
    .route("/auth/register", post(users::register::<S>))
    .route("/auth/login", post(users::login::<S>))
    .route("/auth/logout", post(users::logout::<S>))
    .route("/user/info", get(users::profile::<S>).put(users::update_profile::<S>))
    .route("/user/password", put(users::change_password::<S>))
    // Articles
    .route("/articles", get(articles::list::<S>).post(articles::create::<S>))
    .route("/articles/recommend", get(articles::recommend::<S>))
    .route("/articles/archive", get(articles::archive::<S>))
    .route(
      "/articles/{id}",
      get(articles::get_one::<S>)
        .put(articles::update::<S>)
        .delete(articles::delete::<S>),
    )
    .route("/articles/{id}/interaction", get(articles::interaction::<S>))
    .route("/articles/{id}/like", post(articles::like::<S>))
    .route("/articles/{id}/collect", post(articles::collect::<S>))
    // Taxonomy
    .route("/categories", get(taxonomy::categories::<S>))
    .route("/tags", get(taxonomy::tags::<S>))
    // Comments
    .route("/comments", get(comments::list::<S>).post(comments::create::<S>))
    .route("/comments/{id}", axum::routing::delete(comments::delete::<S>))
    .with_state(state)
}
