//! Categories and tags, the named lookup entities, unique by name.
//!
//! Articles store their category and tags as denormalized text, so nothing
//! here is referenced by key.

use serde::{Deserialize, Serialize};

/// Categories seeded into a fresh store.
pub const DEFAULT_CATEGORIES: &[&str] = &["Tech", "Life", "Essays"];

/// Tags seeded into a fresh store.
pub const DEFAULT_TAGS: &[&str] =
  &["Go", "React", "Vue", "JavaScript", "Backend", "Frontend"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub id:   i64,
  pub name: String,
}
