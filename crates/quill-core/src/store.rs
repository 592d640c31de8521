//! The `BlogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `quill-store-sqlite`).
//! Higher layers (`quill-api`, `quill-server`) depend on this abstraction, not
//! on any concrete backend, and receive the store handle explicitly.

use std::future::Future;

use chrono::Duration;

use crate::{
  Classify,
  article::{Article, ArticleId, ArticlePatch, NewArticle},
  comment::{Comment, CommentId, CommentThread, NewComment},
  interaction::{Interaction, MarkKind},
  listing::{Archive, Page, PageRequest},
  taxonomy::{Category, Tag},
  user::{Identity, NewUser, Role, User, UserId, UserPatch},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`BlogStore::list_articles`]. Supplied filters are
/// AND-combined.
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
  /// Exact match on the category label.
  pub category: Option<String>,
  /// Substring match against the serialized tag blob, so `"vue"` also
  /// matches `"vuex"`. `%` and `_` are not escaped and act as SQL `LIKE`
  /// wildcards.
  pub tag:      Option<String>,
  /// Substring match against title or summary. `%` and `_` act as wildcards
  /// here too.
  pub keyword:  Option<String>,
  pub page:     PageRequest,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Quill storage backend.
///
/// Counter-bearing mutations (view increment, like toggle, comment add and
/// delete) apply their counter delta together with the primary write.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait BlogStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Articles ──────────────────────────────────────────────────────────

  /// Filtered page of articles, newest first, with the unpaginated total.
  fn list_articles(
    &self,
    query: ArticleQuery,
  ) -> impl Future<Output = Result<Page<Article>, Self::Error>> + Send + '_;

  /// Fetch an article for reading. Increments `view_count` and returns the
  /// article as it stands after the increment.
  fn get_article(
    &self,
    id: ArticleId,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Fetch an article without counting a view. Returns `None` if absent.
  fn find_article(
    &self,
    id: ArticleId,
  ) -> impl Future<Output = Result<Option<Article>, Self::Error>> + Send + '_;

  /// Top `limit` articles by view count; ties go to the older id.
  fn recommend_articles(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Article>, Self::Error>> + Send + '_;

  /// Every article bucketed by creation month, newest first in each bucket.
  fn archive(&self) -> impl Future<Output = Result<Archive, Self::Error>> + Send + '_;

  /// Persist a new article with zeroed counters.
  fn create_article(
    &self,
    author_id: UserId,
    input: NewArticle,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Overwrite only the fields the patch supplies.
  fn update_article(
    &self,
    id: ArticleId,
    patch: ArticlePatch,
  ) -> impl Future<Output = Result<Article, Self::Error>> + Send + '_;

  /// Remove an article. Marks and comments referencing it are left in place.
  fn delete_article(
    &self,
    id: ArticleId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Taxonomy ──────────────────────────────────────────────────────────

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn list_tags(&self) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  // ── Interaction ledger ────────────────────────────────────────────────

  /// Flip the `(user, article)` mark of `kind` and return the new state:
  /// `true` when the mark now exists.
  fn toggle_mark(
    &self,
    kind: MarkKind,
    user_id: UserId,
    article_id: ArticleId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Which marks `user_id` holds on `article_id`.
  fn interaction(
    &self,
    user_id: UserId,
    article_id: ArticleId,
  ) -> impl Future<Output = Result<Interaction, Self::Error>> + Send + '_;

  // ── Comment thread ────────────────────────────────────────────────────

  /// Root comments of an article, each with its direct replies.
  fn list_comments(
    &self,
    article_id: ArticleId,
  ) -> impl Future<Output = Result<Vec<CommentThread>, Self::Error>> + Send + '_;

  /// Add a comment by `author_id`, snapshotting the author's username and
  /// avatar and resolving the reply target.
  fn add_comment(
    &self,
    author_id: UserId,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Delete a comment owned by `requester_id`. Replies are not touched.
  fn delete_comment(
    &self,
    id: CommentId,
    requester_id: UserId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user. Fails if the username is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look a user up by name, including the password hash.
  fn user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn update_user(
    &self,
    id: UserId,
    patch: UserPatch,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn set_password_hash(
    &self,
    id: UserId,
    password_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Assign `role` to the named user. Returns `false` if no such user exists.
  fn set_role(
    &self,
    username: String,
    role: Role,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Issue a bearer token for `user_id`, valid for `ttl`.
  fn create_session(
    &self,
    user_id: UserId,
    ttl: Duration,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Resolve a bearer token. Unknown and expired tokens yield `None`.
  fn resolve_session(
    &self,
    token: String,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  fn revoke_session(
    &self,
    token: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
