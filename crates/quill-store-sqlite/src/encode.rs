//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order is chronological order. Tags are stored as a compact
//! JSON array.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use quill_core::{
  article::Article,
  comment::{Comment, ParentComment},
  interaction::MarkKind,
  user::{Role, User},
};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time, truncated to what survives a round trip through
/// [`encode_dt`].
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

/// The last instant whose encoding keeps the four-digit year.
fn latest_encodable() -> DateTime<Utc> {
  NaiveDate::from_ymd_opt(9999, 12, 31)
    .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
    .map_or(DateTime::<Utc>::MAX_UTC, |dt| dt.and_utc())
}

/// `from + ttl`, saturating at the last fixed-width timestamp. A negative
/// overflow expires at `from`.
pub fn expiry(from: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
  let latest = latest_encodable();
  match from.checked_add_signed(ttl) {
    Some(at) => at.min(latest),
    None if ttl < Duration::zero() => from,
    None => latest,
  }
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str {
  match r {
    Role::User => "user",
    Role::Admin => "admin",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "user" => Ok(Role::User),
    "admin" => Ok(Role::Admin),
    other => Err(Error::UnknownRole(other.to_owned())),
  }
}

// ─── Marks ───────────────────────────────────────────────────────────────────

pub fn mark_table(kind: MarkKind) -> &'static str {
  match kind {
    MarkKind::Like => "article_likes",
    MarkKind::Collect => "article_collects",
  }
}

// ─── Session tokens ──────────────────────────────────────────────────────────

pub fn hash_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ARTICLE_COLUMNS: &str = "id, title, summary, content, cover, category, tags, \
   author_id, view_count, like_count, comment_count, created_at, updated_at";

/// Raw values read directly from an `articles` row.
pub struct RawArticle {
  pub id:            i64,
  pub title:         String,
  pub summary:       String,
  pub content:       String,
  pub cover:         String,
  pub category:      String,
  pub tags:          String,
  pub author_id:     i64,
  pub view_count:    i64,
  pub like_count:    i64,
  pub comment_count: i64,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawArticle {
  /// Read a row selected with [`ARTICLE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      title:         row.get(1)?,
      summary:       row.get(2)?,
      content:       row.get(3)?,
      cover:         row.get(4)?,
      category:      row.get(5)?,
      tags:          row.get(6)?,
      author_id:     row.get(7)?,
      view_count:    row.get(8)?,
      like_count:    row.get(9)?,
      comment_count: row.get(10)?,
      created_at:    row.get(11)?,
      updated_at:    row.get(12)?,
    })
  }

  pub fn into_article(self) -> Result<Article> {
    Ok(Article {
      id:            self.id,
      title:         self.title,
      summary:       self.summary,
      content:       self.content,
      cover:         self.cover,
      category:      self.category,
      tags:          decode_tags(&self.tags)?,
      author_id:     self.author_id,
      view_count:    self.view_count,
      like_count:    self.like_count,
      comment_count: self.comment_count,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

pub const COMMENT_COLUMNS: &str =
  "id, article_id, user_id, username, avatar, content, parent_id, reply_to, created_at";

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub id:         i64,
  pub article_id: i64,
  pub user_id:    i64,
  pub username:   String,
  pub avatar:     String,
  pub content:    String,
  pub parent_id:  Option<i64>,
  pub reply_to:   Option<String>,
  pub created_at: String,
}

impl RawComment {
  /// Read a row selected with [`COMMENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      article_id: row.get(1)?,
      user_id:    row.get(2)?,
      username:   row.get(3)?,
      avatar:     row.get(4)?,
      content:    row.get(5)?,
      parent_id:  row.get(6)?,
      reply_to:   row.get(7)?,
      created_at: row.get(8)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:         self.id,
      article_id: self.article_id,
      user_id:    self.user_id,
      username:   self.username,
      avatar:     self.avatar,
      content:    self.content,
      parent_id:  self.parent_id,
      reply_to:   self.reply_to,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Read the reply-placement columns of a comment.
pub fn parent_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ParentComment> {
  Ok(ParentComment {
    id:         row.get(0)?,
    article_id: row.get(1)?,
    parent_id:  row.get(2)?,
    username:   row.get(3)?,
  })
}

pub const USER_COLUMNS: &str =
  "id, username, password_hash, nickname, email, avatar, role, created_at, updated_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub password_hash: String,
  pub nickname:      String,
  pub email:         String,
  pub avatar:        String,
  pub role:          String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawUser {
  /// Read a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      nickname:      row.get(3)?,
      email:         row.get(4)?,
      avatar:        row.get(5)?,
      role:          row.get(6)?,
      created_at:    row.get(7)?,
      updated_at:    row.get(8)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      password_hash: self.password_hash,
      nickname:      self.nickname,
      email:         self.email,
      avatar:        self.avatar,
      role:          decode_role(&self.role)?,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}
