//! SQL schema for the Quill SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! References between tables are weak: there are no foreign keys, so deleting
//! an article leaves its marks and comments in place.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    nickname      TEXT NOT NULL DEFAULT '',
    email         TEXT NOT NULL DEFAULT '',
    avatar        TEXT NOT NULL DEFAULT '',
    role          TEXT NOT NULL DEFAULT 'user',   -- 'user' | 'admin'
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Only the SHA-256 of a bearer token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash  TEXT PRIMARY KEY,
    user_id     INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS articles (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT NOT NULL,
    summary       TEXT NOT NULL DEFAULT '',
    content       TEXT NOT NULL,
    cover         TEXT NOT NULL DEFAULT '',
    category      TEXT NOT NULL,
    tags          TEXT NOT NULL DEFAULT '[]',     -- JSON array
    author_id     INTEGER NOT NULL,
    view_count    INTEGER NOT NULL DEFAULT 0 CHECK (view_count    >= 0),
    like_count    INTEGER NOT NULL DEFAULT 0 CHECK (like_count    >= 0),
    comment_count INTEGER NOT NULL DEFAULT 0 CHECK (comment_count >= 0),
    created_at    TEXT NOT NULL,                  -- RFC 3339 UTC, fixed width
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS tags (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

-- A row's existence is the mark; the key makes duplicates impossible.
CREATE TABLE IF NOT EXISTS article_likes (
    user_id     INTEGER NOT NULL,
    article_id  INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, article_id)
);

CREATE TABLE IF NOT EXISTS article_collects (
    user_id     INTEGER NOT NULL,
    article_id  INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, article_id)
);

CREATE TABLE IF NOT EXISTS comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id  INTEGER NOT NULL,
    user_id     INTEGER NOT NULL,
    username    TEXT NOT NULL,                    -- snapshot at creation
    avatar      TEXT NOT NULL DEFAULT '',         -- snapshot at creation
    content     TEXT NOT NULL,
    parent_id   INTEGER,                          -- NULL for roots
    reply_to    TEXT,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS articles_created_idx  ON articles(created_at);
CREATE INDEX IF NOT EXISTS articles_views_idx    ON articles(view_count);
CREATE INDEX IF NOT EXISTS articles_category_idx ON articles(category);
CREATE INDEX IF NOT EXISTS comments_article_idx  ON comments(article_id);
CREATE INDEX IF NOT EXISTS comments_parent_idx   ON comments(parent_id);
CREATE INDEX IF NOT EXISTS likes_article_idx     ON article_likes(article_id);
CREATE INDEX IF NOT EXISTS collects_article_idx  ON article_collects(article_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx     ON sessions(user_id);

PRAGMA user_version = 1;
";
