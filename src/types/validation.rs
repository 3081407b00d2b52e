//! Request and verdict exchanged with the reasoning oracle.

use serde::{Deserialize, Serialize};

use super::{Node, NodeId, RelationKind};

/// The edge being judged.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposedEdge {
  pub source: NodeId,
  pub target: NodeId,
  pub relation: RelationKind,
}

/// Layout signals derived from node positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpatialHints {
  /// Source sits above target on screen.
  pub is_source_higher: bool,
  /// Vertical distance exceeds the bias threshold.
  pub is_vertical_bias: bool,
}

impl SpatialHints {
  /// Derives hints from two node positions; `threshold` is in pixels.
  pub fn between(source: &Node, target: &Node, threshold: f64) -> Self {
    Self {
      is_source_higher: source.y < target.y,
      is_vertical_bias: (source.y - target.y).abs() > threshold,
    }
  }
}

/// One validation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
  pub session_id: String,
  pub proposed_edge: ProposedEdge,
  /// Time from session start to the proposal. A behavioural signal, not a timeout.
  pub elapsed_thinking_time_ms: u64,
  pub spatial_hints: SpatialHints,
}

/// The oracle's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
  pub is_valid: bool,
  #[serde(default)]
  pub logic_path: Option<String>,
}

impl Verdict {
  pub fn valid() -> Self {
    Self {
      is_valid: true,
      logic_path: None,
    }
  }

  pub fn rejected(logic_path: impl Into<String>) -> Self {
    Self {
      is_valid: false,
      logic_path: Some(logic_path.into()),
    }
  }
}
