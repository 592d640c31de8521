//! Comments: flat rows forming a two-level thread.
//!
//! A comment without a parent is a root; a comment with a parent is a reply
//! displayed under that root. The author's username and avatar are
//! snapshotted into the row at creation time and never re-joined.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, article::ArticleId, user::UserId};

pub type CommentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id:         CommentId,
  pub article_id: ArticleId,
  pub user_id:    UserId,
  /// Author's username when the comment was written.
  pub username:   String,
  /// Author's avatar when the comment was written.
  pub avatar:     String,
  pub content:    String,
  pub parent_id:  Option<CommentId>,
  /// Display name of the author being replied to, if resolved.
  pub reply_to:   Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Comment {
  pub fn is_root(&self) -> bool { self.parent_id.is_none() }
}

/// A root comment together with its direct replies, oldest reply first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
  #[serde(flatten)]
  pub comment:  Comment,
  pub children: Vec<Comment>,
}

/// Input to [`crate::store::BlogStore::add_comment`]. The author is supplied
/// separately from the caller's identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
  pub article_id: ArticleId,
  #[serde(default)]
  pub content:    String,
  pub parent_id:  Option<CommentId>,
}

impl NewComment {
  pub fn validate(&self) -> Result<()> {
    if self.content.trim().is_empty() {
      return Err(Error::MissingField("content"));
    }
    Ok(())
  }
}

// ─── Reply resolution ────────────────────────────────────────────────────────

/// The columns of a would-be parent needed to place a reply.
#[derive(Debug, Clone)]
pub struct ParentComment {
  pub id:         CommentId,
  pub article_id: ArticleId,
  pub parent_id:  Option<CommentId>,
  pub username:   String,
}

/// Where a new comment attaches and whom it names as the addressee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
  pub parent_id: Option<CommentId>,
  pub reply_to:  Option<String>,
}

/// Decide the stored parent and `reply_to` of a new comment on `article_id`.
///
/// - No requested parent: a root.
/// - Requested parent not found: kept as given, `reply_to` left empty.
/// - Parent on another article: rejected.
/// - Parent is itself a reply: re-pointed at that reply's root so the thread
///   stays two levels deep, still addressed to the reply's author.
pub fn reply_target(
  article_id: ArticleId,
  requested: Option<CommentId>,
  found: Option<ParentComment>,
) -> Result<ReplyTarget> {
  let Some(requested) = requested else {
    return Ok(ReplyTarget { parent_id: None, reply_to: None });
  };
  let Some(parent) = found else {
    return Ok(ReplyTarget { parent_id: Some(requested), reply_to: None });
  };

  if parent.article_id != article_id {
    return Err(Error::ReplyAcrossArticles {
      parent_id: parent.id,
      parent_article: parent.article_id,
      article_id,
    });
  }

  Ok(ReplyTarget {
    parent_id: Some(parent.parent_id.unwrap_or(parent.id)),
    reply_to:  Some(parent.username),
  })
}
