//! Domain types shared by the registry, store, gesture machine and controller.

mod drag_proposal;
mod edge;
mod edge_status;
#[cfg(test)]
mod edge_status_test;
mod feedback_command;
mod node;
mod relation_kind;
#[cfg(test)]
mod relation_kind_test;
mod session_context;
#[cfg(test)]
mod session_context_test;
mod validation;

pub use drag_proposal::DragProposal;
pub use edge::{Edge, EdgeId};
pub use edge_status::EdgeStatus;
pub use feedback_command::{
  AudioCue, FeedbackCommand, FeedbackEvent, FeedbackKind, UnknownFeedbackKind, VisualCue,
};
pub use node::{Node, NodeId, Point};
pub use relation_kind::RelationKind;
pub use session_context::{MAX_COMPLEXITY, SessionContext};
pub use validation::{ProposedEdge, SpatialHints, ValidationRequest, Verdict};
