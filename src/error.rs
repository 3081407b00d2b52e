//! Error taxonomy.
//!
//! - Gesture mistakes (self-loop, duplicate pending, already valid) abort a
//!   proposal silently.
//! - Gateway failures fail the edge closed to `Rejected`.
//! - Store contract violations (double settle, unknown edge) fail the single
//!   operation and leave the session usable.

use crate::types::{EdgeId, EdgeStatus, NodeId};

/// Node registry failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
  #[error("node registry is already loaded")]
  AlreadyLoaded,
  #[error("node not found: {0}")]
  NotFound(NodeId),
  #[error("duplicate node id: {0}")]
  DuplicateNode(NodeId),
}

/// Edge store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
  #[error("self-loop on node {0}")]
  SelfLoop(NodeId),
  #[error("duplicate edge id: {0}")]
  DuplicateEdgeId(EdgeId),
  #[error("an edge between {from} and {to} is already pending")]
  DuplicatePending { from: NodeId, to: NodeId },
  #[error("edge {from} -> {to} is already valid")]
  AlreadyValid { from: NodeId, to: NodeId },
  #[error("edge {edge_id} is not pending (status: {status:?})")]
  NotPending {
    edge_id: EdgeId,
    status: Option<EdgeStatus>,
  },
  #[error("edge {edge_id} is not rejected (status: {status:?})")]
  NotRejected {
    edge_id: EdgeId,
    status: Option<EdgeStatus>,
  },
}

impl StoreError {
  /// Mistakes in the user's gesture rather than contract violations.
  pub fn is_gesture_error(&self) -> bool {
    matches!(
      self,
      StoreError::SelfLoop(_)
        | StoreError::DuplicatePending { .. }
        | StoreError::AlreadyValid { .. }
    )
  }
}

/// Oracle transport failures. Every variant is treated as unreachable.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
  #[error("oracle unreachable: {0}")]
  Unreachable(#[from] reqwest::Error),
  #[error("oracle answered with HTTP {0}")]
  UnexpectedStatus(u16),
  #[error("oracle call panicked: {0}")]
  Panicked(String),
}

/// Session bootstrap failures.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
  #[error("cannot reach session service: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("session service answered with HTTP {0}")]
  UnexpectedStatus(u16),
  #[error(transparent)]
  Registry(#[from] RegistryError),
  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Configuration failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
  #[error("{key} must be a non-negative integer, got {value:?}")]
  InvalidNumber { key: String, value: String },
}

/// Failure observed while waiting for a proposal to settle.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error("validation task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}
