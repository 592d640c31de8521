//! The interaction ledger's vocabulary: like and collect marks.
//!
//! A mark's existence is its state. There is no boolean column; toggling on
//! inserts the `(user, article)` row and toggling off deletes it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkKind {
  Like,
  Collect,
}

impl MarkKind {
  /// Whether toggling this kind moves an article counter. Collects are
  /// tracked without a visible count.
  pub fn counts(self) -> bool { matches!(self, Self::Like) }
}

/// A user's marks on one article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
  pub liked:     bool,
  pub collected: bool,
}
