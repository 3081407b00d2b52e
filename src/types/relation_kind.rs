//! Relation carried by an edge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relation tag of an edge, e.g. `GREATER` or `DURING`.
///
/// Kept as an open tag: premises from the bootstrap may carry relations this
/// crate never proposes itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationKind(String);

impl RelationKind {
  pub const GREATER: &'static str = "GREATER";
  pub const DURING: &'static str = "DURING";

  pub fn new(tag: impl Into<String>) -> Self {
    Self(tag.into())
  }

  /// The relation used for every drag proposal.
  pub fn greater() -> Self {
    Self::new(Self::GREATER)
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Temporal relations are drawn pulsing by renderers.
  pub fn is_temporal(&self) -> bool {
    self.0.eq_ignore_ascii_case(Self::DURING)
  }
}

impl Default for RelationKind {
  fn default() -> Self {
    Self::greater()
  }
}

impl fmt::Display for RelationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
