//! Articles and the inputs that create or modify them.
//!
//! An article carries three denormalized counters. They are maintained by
//! applying deltas alongside the mutation that causes them and are never
//! recomputed from the ledger or comment rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Error, Result,
  user::{Identity, Role, UserId},
};

pub type ArticleId = i64;

// ─── Article ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  pub id:            ArticleId,
  pub title:         String,
  pub summary:       String,
  /// The article body.
  pub content:       String,
  /// Reference to the cover image (usually a URL).
  pub cover:         String,
  /// Free-text category label; not a foreign key.
  pub category:      String,
  pub tags:          Vec<String>,
  pub author_id:     UserId,
  pub view_count:    i64,
  /// Number of live like marks for this article.
  pub like_count:    i64,
  /// Number of live comment rows (roots and replies) for this article.
  pub comment_count: i64,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

impl Article {
  /// Authors may edit their own articles; admins may edit any.
  pub fn check_editable_by(&self, who: &Identity) -> Result<()> {
    if who.user_id == self.author_id || who.role == Role::Admin {
      Ok(())
    } else {
      Err(Error::NotArticleAuthor {
        article_id: self.id,
        user_id:    who.user_id,
      })
    }
  }
}

// ─── NewArticle ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::BlogStore::create_article`]. Counters and
/// timestamps are always set by the store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewArticle {
  pub title:    String,
  pub summary:  String,
  pub content:  String,
  pub cover:    String,
  pub category: String,
  /// Missing and `null` both mean no tags.
  #[serde(deserialize_with = "null_as_empty")]
  pub tags:     Vec<String>,
}

fn null_as_empty<'de, D>(d: D) -> std::result::Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<Vec<String>>::deserialize(d).map(Option::unwrap_or_default)
}

impl NewArticle {
  /// Title, content and category are required.
  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::MissingField("title"));
    }
    if self.content.trim().is_empty() {
      return Err(Error::MissingField("content"));
    }
    if self.category.trim().is_empty() {
      return Err(Error::MissingField("category"));
    }
    Ok(())
  }
}

// ─── ArticlePatch ────────────────────────────────────────────────────────────

/// Partial update for an article. An absent field, or an empty string, leaves
/// the stored value unchanged; there is no way to blank a text field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
  pub title:    Option<String>,
  pub summary:  Option<String>,
  pub content:  Option<String>,
  pub cover:    Option<String>,
  pub category: Option<String>,
  /// `None` (or JSON `null`) leaves tags alone; `Some(vec![])` clears them.
  pub tags:     Option<Vec<String>>,
}

impl ArticlePatch {
  /// Drop empty strings so every remaining `Some` is an overwrite.
  pub fn without_blanks(self) -> Self {
    fn keep(s: Option<String>) -> Option<String> {
      s.filter(|s| !s.is_empty())
    }
    Self {
      title:    keep(self.title),
      summary:  keep(self.summary),
      content:  keep(self.content),
      cover:    keep(self.cover),
      category: keep(self.category),
      tags:     self.tags,
    }
  }
}
