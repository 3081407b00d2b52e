//! A directed edge between two logic nodes.

use serde::{Deserialize, Serialize};

use super::{EdgeStatus, NodeId, RelationKind};

/// Unique edge identity.
pub type EdgeId = String;

/// A directed edge between two logic nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
  pub id: EdgeId,
  pub source: NodeId,
  pub target: NodeId,
  pub relation: RelationKind,
  pub status: EdgeStatus,
  /// Loaded from a prior session; never goes through validation.
  pub is_static: bool,
}

impl Edge {
  /// An edge loaded at session start. Always `Valid`.
  pub fn premise(
    id: impl Into<EdgeId>,
    source: impl Into<NodeId>,
    target: impl Into<NodeId>,
    relation: RelationKind,
  ) -> Self {
    Self {
      id: id.into(),
      source: source.into(),
      target: target.into(),
      relation,
      status: EdgeStatus::Valid,
      is_static: true,
    }
  }
}
