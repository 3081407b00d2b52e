//! Gesture state machine: turns pointer events into connection proposals.
//!
//! Two states only. Dragging ends the moment the pointer is released,
//! whatever happens to the proposal afterwards. The machine itself has no
//! side effects; the caller acts on the returned [`GestureOutcome`].

use std::sync::Arc;

use tracing::{debug, trace};

use crate::node_registry::NodeRegistry;
use crate::types::{DragProposal, NodeId, Point};

/// Raw pointer input. `node` is the node under the pointer, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
  Down { node: Option<NodeId>, position: Point },
  Move { position: Point },
  Up { node: Option<NodeId>, position: Point },
}

/// A finished drag between two distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
  pub source: NodeId,
  pub target: NodeId,
}

/// What a pointer event did to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
  /// Idle -> Dragging. The caller emits the connection-start cue.
  Started { source: NodeId },
  /// Pointer moved while dragging.
  Moved,
  /// Dropped on another node. The caller hands this to the controller.
  Handoff(Handoff),
  /// Dropped on the source node or outside any node.
  Discarded,
  /// Event has no meaning in the current state.
  Ignored,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum GestureState {
  #[default]
  Idle,
  Dragging(DragProposal),
}

/// Gesture state machine. Owns the current [`DragProposal`].
#[derive(Debug)]
pub struct GestureStateMachine {
  registry: Arc<NodeRegistry>,
  state: GestureState,
}

impl GestureStateMachine {
  pub fn new(registry: Arc<NodeRegistry>) -> Self {
    Self {
      registry,
      state: GestureState::Idle,
    }
  }

  pub fn is_dragging(&self) -> bool {
    matches!(self.state, GestureState::Dragging(_))
  }

  /// The drag in progress, if any.
  pub fn proposal(&self) -> Option<&DragProposal> {
    match &self.state {
      GestureState::Dragging(p) => Some(p),
      GestureState::Idle => None,
    }
  }

  /// Node ids the registry does not know count as "outside any node".
  fn known(&self, node: Option<NodeId>) -> Option<NodeId> {
    node.filter(|id| self.registry.contains(id))
  }

  pub fn handle(&mut self, event: PointerEvent) -> GestureOutcome {
    match event {
      PointerEvent::Down { node, position } => match self.known(node) {
        Some(source) => {
          debug!(source = %source, "drag started");
          self.state = GestureState::Dragging(DragProposal {
            source_id: source.clone(),
            pointer_position: position,
          });
          GestureOutcome::Started { source }
        }
        None => GestureOutcome::Ignored,
      },
      PointerEvent::Move { position } => match &mut self.state {
        GestureState::Dragging(p) => {
          p.pointer_position = position;
          trace!(x = position.x, y = position.y, "drag moved");
          GestureOutcome::Moved
        }
        GestureState::Idle => GestureOutcome::Ignored,
      },
      PointerEvent::Up { node, .. } => {
        let target = self.known(node);
        match std::mem::take(&mut self.state) {
          GestureState::Idle => GestureOutcome::Ignored,
          GestureState::Dragging(p) => match target {
            Some(target) if target != p.source_id => {
              debug!(source = %p.source_id, target = %target, "drag dropped on node");
              GestureOutcome::Handoff(Handoff {
                source: p.source_id,
                target,
              })
            }
            _ => {
              debug!(source = %p.source_id, "drag discarded");
              GestureOutcome::Discarded
            }
          },
        }
      }
    }
  }
}
