//! The connection currently being dragged.

use super::{NodeId, Point};

/// The connection currently being dragged. Exists only while a gesture is in
/// progress.
#[derive(Debug, Clone, PartialEq)]
pub struct DragProposal {
  pub source_id: NodeId,
  pub pointer_position: Point,
}
