//! Query and listing helpers: pure shaping of rows the store has already read.
//!
//! Nothing here touches storage: pagination defaults, archive bucketing and
//! comment-thread assembly all operate on plain values.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  article::Article,
  comment::{Comment, CommentId, CommentThread},
};

// ─── Pagination ──────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_RECOMMEND_LIMIT: u32 = 5;

/// A 1-based page request. No upper bound is placed on `page_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:      u32,
  pub page_size: u32,
}

impl Default for PageRequest {
  fn default() -> Self {
    Self { page: DEFAULT_PAGE, page_size: DEFAULT_PAGE_SIZE }
  }
}

impl PageRequest {
  /// Parse raw query values; absent, non-numeric or zero values fall back to
  /// the defaults.
  pub fn from_params(page: Option<&str>, page_size: Option<&str>) -> Self {
    fn parse(raw: Option<&str>, default: u32) -> u32 {
      raw
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
    }
    Self {
      page:      parse(page, DEFAULT_PAGE),
      page_size: parse(page_size, DEFAULT_PAGE_SIZE),
    }
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
  }
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  #[serde(rename = "list")]
  pub items:     Vec<T>,
  pub total:     u64,
  pub page:      u32,
  pub page_size: u32,
}

// ─── Archive ─────────────────────────────────────────────────────────────────

/// Articles bucketed by `YYYY-MM` of their creation time.
pub type Archive = BTreeMap<String, Vec<Article>>;

pub fn month_key(at: &DateTime<Utc>) -> String { at.format("%Y-%m").to_string() }

/// Bucket `articles` by creation month. Order within a bucket is the input
/// order, so callers pass articles newest-first.
pub fn group_by_month(articles: Vec<Article>) -> Archive {
  let mut archive = Archive::new();
  for article in articles {
    archive
      .entry(month_key(&article.created_at))
      .or_default()
      .push(article);
  }
  archive
}

// ─── Comment threads ─────────────────────────────────────────────────────────

/// Assemble an article's flat comment rows into two-level threads.
///
/// Roots come out newest-first and each root's direct replies oldest-first;
/// ties on the timestamp fall back to id. Replies whose parent is not a live
/// root (orphans left behind by a deleted root) are not returned.
pub fn assemble_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
  let (mut roots, replies): (Vec<_>, Vec<_>) =
    comments.into_iter().partition(Comment::is_root);

  let mut children: HashMap<CommentId, Vec<Comment>> = HashMap::new();
  for reply in replies {
    if let Some(parent_id) = reply.parent_id {
      children.entry(parent_id).or_default().push(reply);
    }
  }

  roots.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

  roots
    .into_iter()
    .map(|root| {
      let mut kids = children.remove(&root.id).unwrap_or_default();
      kids.sort_by_key(|c| (c.created_at, c.id));
      CommentThread { comment: root, children: kids }
    })
    .collect()
}
