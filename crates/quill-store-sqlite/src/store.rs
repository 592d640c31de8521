//! [`SqliteStore`], the SQLite implementation of [`BlogStore`].

use std::path::Path;

use chrono::Duration;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use quill_core::{
  Error as CoreError,
  article::{Article, ArticleId, ArticlePatch, NewArticle},
  comment::{Comment, CommentId, CommentThread, NewComment, reply_target},
  interaction::{Interaction, MarkKind},
  listing::{Archive, Page, assemble_threads, group_by_month},
  store::{ArticleQuery, BlogStore},
  taxonomy::{Category, DEFAULT_CATEGORIES, DEFAULT_TAGS, Tag},
  user::{Identity, NewUser, Role, User, UserId, UserPatch},
};

use crate::{
  Error, Result,
  encode::{
    ARTICLE_COLUMNS, COMMENT_COLUMNS, RawArticle, RawComment, RawUser, USER_COLUMNS,
    decode_role, encode_dt, encode_role, encode_tags, expiry, hash_token, mark_table, now,
    parent_from_row,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quill store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs on the connection's own thread, one at a time; each counter-bearing
/// mutation is a single transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;

        let tx = conn.transaction()?;
        {
          let mut categories =
            tx.prepare("INSERT OR IGNORE INTO categories (name) VALUES (?1)")?;
          for name in DEFAULT_CATEGORIES {
            categories.execute(rusqlite::params![name])?;
          }
          let mut tags = tx.prepare("INSERT OR IGNORE INTO tags (name) VALUES (?1)")?;
          for name in DEFAULT_TAGS {
            tags.execute(rusqlite::params![name])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn session_count(&self) -> Result<i64> {
    Ok(
      self
        .conn
        .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM sessions", [], |r| r.get(0))?))
        .await?,
    )
  }
}

// ─── Connection-thread helpers ───────────────────────────────────────────────

fn select_article(
  conn: &rusqlite::Connection,
  id: ArticleId,
) -> rusqlite::Result<Option<RawArticle>> {
  conn
    .query_row(
      &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
      [id],
      RawArticle::from_row,
    )
    .optional()
}

fn article_exists(conn: &rusqlite::Connection, id: ArticleId) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM articles WHERE id = ?1)",
    [id],
    |r| r.get(0),
  )
}

fn mark_exists(
  conn: &rusqlite::Connection,
  kind: MarkKind,
  user_id: UserId,
  article_id: ArticleId,
) -> rusqlite::Result<bool> {
  conn.query_row(
    &format!(
      "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = ?1 AND article_id = ?2)",
      mark_table(kind)
    ),
    rusqlite::params![user_id, article_id],
    |r| r.get(0),
  )
}

fn select_user(
  conn: &rusqlite::Connection,
  column: &str,
  key: Value,
) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
      [key],
      RawUser::from_row,
    )
    .optional()
}

// ─── BlogStore impl ──────────────────────────────────────────────────────────

impl BlogStore for SqliteStore {
  type Error = Error;

  // ── Articles ──────────────────────────────────────────────────────────────

  async fn list_articles(&self, query: ArticleQuery) -> Result<Page<Article>> {
    // Build WHERE clause dynamically; `args` lines up with the placeholders.
    let mut conds: Vec<&'static str> = vec![];
    let mut args: Vec<Value> = vec![];
    if let Some(category) = query.category {
      conds.push("category = ?");
      args.push(Value::Text(category));
    }
    if let Some(tag) = query.tag {
      conds.push("tags LIKE ?");
      args.push(Value::Text(format!("%{tag}%")));
    }
    if let Some(keyword) = query.keyword {
      let pattern = format!("%{keyword}%");
      conds.push("(title LIKE ? OR summary LIKE ?)");
      args.push(Value::Text(pattern.clone()));
      args.push(Value::Text(pattern));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    let page = query.page;
    let limit = i64::from(page.page_size);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    let (total, raws): (i64, Vec<RawArticle>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM articles {where_clause}"),
          rusqlite::params_from_iter(args.iter()),
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {ARTICLE_COLUMNS} FROM articles {where_clause}
           ORDER BY created_at DESC, id DESC
           LIMIT ? OFFSET ?"
        ))?;
        let mut page_args = args;
        page_args.push(Value::Integer(limit));
        page_args.push(Value::Integer(offset));
        let rows = stmt
          .query_map(rusqlite::params_from_iter(page_args.iter()), RawArticle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(Page {
      items:     raws
        .into_iter()
        .map(RawArticle::into_article)
        .collect::<Result<_>>()?,
      total:     u64::try_from(total).unwrap_or_default(),
      page:      page.page,
      page_size: page.page_size,
    })
  }

  async fn get_article(&self, id: ArticleId) -> Result<Article> {
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let bumped = tx.execute(
          "UPDATE articles SET view_count = view_count + 1 WHERE id = ?1",
          [id],
        )?;
        if bumped == 0 {
          return Ok(None);
        }
        let raw = select_article(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(CoreError::ArticleNotFound(id))?.into_article()
  }

  async fn find_article(&self, id: ArticleId) -> Result<Option<Article>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_article(conn, id)?))
      .await?;

    raw.map(RawArticle::into_article).transpose()
  }

  async fn recommend_articles(&self, limit: u32) -> Result<Vec<Article>> {
    let limit = i64::from(limit);

    let raws: Vec<RawArticle> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ARTICLE_COLUMNS} FROM articles
           ORDER BY view_count DESC, id ASC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map([limit], RawArticle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArticle::into_article).collect()
  }

  async fn archive(&self) -> Result<Archive> {
    let raws: Vec<RawArticle> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawArticle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let articles = raws
      .into_iter()
      .map(RawArticle::into_article)
      .collect::<Result<Vec<_>>>()?;
    Ok(group_by_month(articles))
  }

  async fn create_article(&self, author_id: UserId, input: NewArticle) -> Result<Article> {
    input.validate()?;

    let now = now();
    let tags_str = encode_tags(&input.tags)?;
    let mut article = Article {
      id: 0,
      title: input.title,
      summary: input.summary,
      content: input.content,
      cover: input.cover,
      category: input.category,
      tags: input.tags,
      author_id,
      view_count: 0,
      like_count: 0,
      comment_count: 0,
      created_at: now,
      updated_at: now,
    };

    let row = article.clone();
    article.id = self
      .conn
      .call(move |conn| {
        let at = encode_dt(row.created_at);
        conn.execute(
          "INSERT INTO articles (
             title, summary, content, cover, category, tags, author_id,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            row.title,
            row.summary,
            row.content,
            row.cover,
            row.category,
            tags_str,
            row.author_id,
            at,
            at,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(article)
  }

  async fn update_article(&self, id: ArticleId, patch: ArticlePatch) -> Result<Article> {
    let patch = patch.without_blanks();
    let tags_str = patch.tags.as_deref().map(encode_tags).transpose()?;
    let updated_at = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE articles SET
             title      = COALESCE(?2, title),
             summary    = COALESCE(?3, summary),
             content    = COALESCE(?4, content),
             cover      = COALESCE(?5, cover),
             category   = COALESCE(?6, category),
             tags       = COALESCE(?7, tags),
             updated_at = ?8
           WHERE id = ?1",
          rusqlite::params![
            id,
            patch.title,
            patch.summary,
            patch.content,
            patch.cover,
            patch.category,
            tags_str,
            updated_at,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = select_article(&tx, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(CoreError::ArticleNotFound(id))?.into_article()
  }

  async fn delete_article(&self, id: ArticleId) -> Result<()> {
    let deleted = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM articles WHERE id = ?1", [id])?))
      .await?;

    if deleted == 0 {
      return Err(CoreError::ArticleNotFound(id).into());
    }
    Ok(())
  }

  // ── Taxonomy ──────────────────────────────────────────────────────────────

  async fn list_categories(&self) -> Result<Vec<Category>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id")?;
          let rows = stmt
            .query_map([], |row| Ok(Category { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY id")?;
          let rows = stmt
            .query_map([], |row| Ok(Tag { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  // ── Interaction ledger ────────────────────────────────────────────────────

  async fn toggle_mark(
    &self,
    kind: MarkKind,
    user_id: UserId,
    article_id: ArticleId,
  ) -> Result<bool> {
    let table = mark_table(kind);
    let counts = kind.counts();
    let at = encode_dt(now());

    // Delete-else-insert against the (user_id, article_id) key, with the
    // counter delta in the same transaction.
    let state = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !article_exists(&tx, article_id)? {
          return Ok(None);
        }

        let removed = tx.execute(
          &format!("DELETE FROM {table} WHERE user_id = ?1 AND article_id = ?2"),
          rusqlite::params![user_id, article_id],
        )?;

        let marked = if removed > 0 {
          if counts {
            tx.execute(
              "UPDATE articles SET like_count = MAX(like_count - 1, 0) WHERE id = ?1",
              [article_id],
            )?;
          }
          false
        } else {
          tx.execute(
            &format!(
              "INSERT INTO {table} (user_id, article_id, created_at) VALUES (?1, ?2, ?3)"
            ),
            rusqlite::params![user_id, article_id, at],
          )?;
          if counts {
            tx.execute(
              "UPDATE articles SET like_count = like_count + 1 WHERE id = ?1",
              [article_id],
            )?;
          }
          true
        };

        tx.commit()?;
        Ok(Some(marked))
      })
      .await?;

    state.ok_or_else(|| CoreError::ArticleNotFound(article_id).into())
  }

  async fn interaction(&self, user_id: UserId, article_id: ArticleId) -> Result<Interaction> {
    let found = self
      .conn
      .call(move |conn| {
        if !article_exists(conn, article_id)? {
          return Ok(None);
        }
        Ok(Some(Interaction {
          liked:     mark_exists(conn, MarkKind::Like, user_id, article_id)?,
          collected: mark_exists(conn, MarkKind::Collect, user_id, article_id)?,
        }))
      })
      .await?;

    found.ok_or_else(|| CoreError::ArticleNotFound(article_id).into())
  }

  // ── Comment thread ────────────────────────────────────────────────────────

  async fn list_comments(&self, article_id: ArticleId) -> Result<Vec<CommentThread>> {
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments WHERE article_id = ?1"
        ))?;
        let rows = stmt
          .query_map([article_id], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let comments = raws
      .into_iter()
      .map(RawComment::into_comment)
      .collect::<Result<Vec<_>>>()?;
    Ok(assemble_threads(comments))
  }

  async fn add_comment(&self, author_id: UserId, input: NewComment) -> Result<Comment> {
    input.validate()?;

    let created_at = now();
    let at = encode_dt(created_at);

    let outcome: std::result::Result<Comment, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let article_id = input.article_id;
        if !article_exists(&tx, article_id)? {
          return Ok(Err(CoreError::ArticleNotFound(article_id)));
        }

        let author: Option<(String, String)> = tx
          .query_row(
            "SELECT username, avatar FROM users WHERE id = ?1",
            [author_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let Some((username, avatar)) = author else {
          return Ok(Err(CoreError::UserNotFound(author_id)));
        };

        let parent = match input.parent_id {
          Some(parent_id) => tx
            .query_row(
              "SELECT id, article_id, parent_id, username FROM comments WHERE id = ?1",
              [parent_id],
              parent_from_row,
            )
            .optional()?,
          None => None,
        };
        let target = match reply_target(article_id, input.parent_id, parent) {
          Ok(target) => target,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "INSERT INTO comments (
             article_id, user_id, username, avatar, content, parent_id, reply_to, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            article_id,
            author_id,
            username,
            avatar,
            input.content,
            target.parent_id,
            target.reply_to,
            at,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
          "UPDATE articles SET comment_count = comment_count + 1 WHERE id = ?1",
          [article_id],
        )?;
        tx.commit()?;

        Ok(Ok(Comment {
          id,
          article_id,
          user_id: author_id,
          username,
          avatar,
          content: input.content,
          parent_id: target.parent_id,
          reply_to: target.reply_to,
          created_at,
        }))
      })
      .await?;

    Ok(outcome?)
  }

  async fn delete_comment(&self, id: CommentId, requester_id: UserId) -> Result<()> {
    let outcome: std::result::Result<(), CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let row: Option<(UserId, ArticleId)> = tx
          .query_row(
            "SELECT user_id, article_id FROM comments WHERE id = ?1",
            [id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        let Some((author_id, article_id)) = row else {
          return Ok(Err(CoreError::CommentNotFound(id)));
        };
        if author_id != requester_id {
          return Ok(Err(CoreError::NotCommentAuthor {
            comment_id: id,
            user_id:    requester_id,
          }));
        }

        tx.execute("DELETE FROM comments WHERE id = ?1", [id])?;
        tx.execute(
          "UPDATE articles SET comment_count = MAX(comment_count - 1, 0) WHERE id = ?1",
          [article_id],
        )?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;

    Ok(outcome?)
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = now();
    let mut user = User {
      id: 0,
      nickname: input.username.clone(),
      username: input.username,
      password_hash: input.password_hash,
      email: input.email,
      avatar: String::new(),
      role: Role::User,
      created_at: now,
      updated_at: now,
    };

    let row = user.clone();
    let id: Option<UserId> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken: bool = tx.query_row(
          "SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1)",
          [&row.username],
          |r| r.get(0),
        )?;
        if taken {
          return Ok(None);
        }

        let at = encode_dt(row.created_at);
        tx.execute(
          "INSERT INTO users (
             username, password_hash, nickname, email, avatar, role, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            row.username,
            row.password_hash,
            row.nickname,
            row.email,
            row.avatar,
            encode_role(row.role),
            at,
            at,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    user.id = id.ok_or_else(|| CoreError::UsernameTaken(user.username.clone()))?;
    Ok(user)
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_user(conn, "id", Value::Integer(id))?))
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn user_by_username(&self, username: String) -> Result<Option<User>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_user(conn, "username", Value::Text(username))?))
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User> {
    let patch = patch.without_blanks();
    let updated_at = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE users SET
             nickname   = COALESCE(?2, nickname),
             avatar     = COALESCE(?3, avatar),
             email      = COALESCE(?4, email),
             updated_at = ?5
           WHERE id = ?1",
          rusqlite::params![id, patch.nickname, patch.avatar, patch.email, updated_at],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = select_user(&tx, "id", Value::Integer(id))?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(CoreError::UserNotFound(id))?.into_user()
  }

  async fn set_password_hash(&self, id: UserId, password_hash: String) -> Result<()> {
    let updated_at = encode_dt(now());
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE id = ?1",
          rusqlite::params![id, password_hash, updated_at],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(CoreError::UserNotFound(id).into());
    }
    Ok(())
  }

  async fn set_role(&self, username: String, role: Role) -> Result<bool> {
    let role_str = encode_role(role);
    let updated_at = encode_dt(now());
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET role = ?2, updated_at = ?3 WHERE username = ?1",
          rusqlite::params![username, role_str, updated_at],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, user_id: UserId, ttl: Duration) -> Result<String> {
    let token = Uuid::new_v4().simple().to_string();
    let token_hash = hash_token(&token);
    let created_at = now();
    let created_str = encode_dt(created_at);
    let expires_str = encode_dt(expiry(created_at, ttl));

    let pruned = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let pruned = tx.execute(
          "DELETE FROM sessions WHERE expires_at <= ?1",
          [&created_str],
        )?;
        tx.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, user_id, created_str, expires_str],
        )?;
        tx.commit()?;
        Ok(pruned)
      })
      .await?;

    if pruned > 0 {
      tracing::debug!(pruned, "expired sessions removed");
    }
    Ok(token)
  }

  async fn resolve_session(&self, token: String) -> Result<Option<Identity>> {
    let token_hash = hash_token(&token);
    let now_str = encode_dt(now());

    let row: Option<(UserId, String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT u.id, u.username, u.role
               FROM sessions s
               JOIN users u ON u.id = s.user_id
               WHERE s.token_hash = ?1
                 AND s.expires_at > ?2",
              rusqlite::params![token_hash, now_str],
              |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(user_id, username, role)| -> Result<Identity> {
        Ok(Identity { user_id, username, role: decode_role(&role)? })
      })
      .transpose()
  }

  async fn revoke_session(&self, token: String) -> Result<()> {
    let token_hash = hash_token(&token);
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM sessions WHERE token_hash = ?1", [token_hash])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
