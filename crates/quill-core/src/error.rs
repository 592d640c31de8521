//! Error types for `quill-core`.

use serde::Serialize;
use thiserror::Error;

use crate::{article::ArticleId, comment::CommentId, user::UserId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("article not found: {0}")]
  ArticleNotFound(ArticleId),

  #[error("comment not found: {0}")]
  CommentNotFound(CommentId),

  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("user {user_id} is not the author of comment {comment_id}")]
  NotCommentAuthor {
    comment_id: CommentId,
    user_id:    UserId,
  },

  #[error("user {user_id} may not modify article {article_id}")]
  NotArticleAuthor {
    article_id: ArticleId,
    user_id:    UserId,
  },

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("comment {parent_id} belongs to article {parent_article}, not {article_id}")]
  ReplyAcrossArticles {
    parent_id:      CommentId,
    parent_article: ArticleId,
    article_id:     ArticleId,
  },

  #[error("username already taken: {0:?}")]
  UsernameTaken(String),

  #[error("invalid username or password")]
  InvalidCredentials,

  #[error("missing or invalid session token")]
  InvalidSession,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// The caller-facing failure taxonomy. Every error surfaced by a store or the
/// API collapses onto exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  Forbidden,
  InvalidInput,
  Unauthenticated,
  Conflict,
  StorageFailure,
}

/// Maps an error onto its [`ErrorKind`].
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::ArticleNotFound(_)
      | Self::CommentNotFound(_)
      | Self::UserNotFound(_) => ErrorKind::NotFound,
      Self::NotCommentAuthor { .. } | Self::NotArticleAuthor { .. } => {
        ErrorKind::Forbidden
      }
      Self::MissingField(_) | Self::ReplyAcrossArticles { .. } => {
        ErrorKind::InvalidInput
      }
      Self::UsernameTaken(_) => ErrorKind::Conflict,
      Self::InvalidCredentials | Self::InvalidSession => {
        ErrorKind::Unauthenticated
      }
      Self::Serialization(_) => ErrorKind::StorageFailure,
    }
  }
}
