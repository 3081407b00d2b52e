//! Lifecycle status of an edge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an edge. Only `Pending -> Valid` and
/// `Pending -> Rejected` are legal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStatus {
  Pending,
  Valid,
  Rejected,
}

impl EdgeStatus {
  pub fn is_terminal(self) -> bool {
    !matches!(self, EdgeStatus::Pending)
  }
}

impl fmt::Display for EdgeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EdgeStatus::Pending => write!(f, "pending"),
      EdgeStatus::Valid => write!(f, "valid"),
      EdgeStatus::Rejected => write!(f, "rejected"),
    }
  }
}
