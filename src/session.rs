//! A live session: one logical event queue feeding the gesture machine and
//! the reconciliation controller.

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, instrument};

use crate::controller::{PendingValidation, ReconciliationController};
use crate::edge_store::EdgeStore;
use crate::gesture::{GestureOutcome, GestureStateMachine, PointerEvent};
use crate::types::{DragProposal, Edge, FeedbackEvent};

pub struct Session {
  gestures: GestureStateMachine,
  controller: ReconciliationController,
}

impl Session {
  pub fn new(controller: ReconciliationController) -> Self {
    Self {
      gestures: GestureStateMachine::new(controller.registry().clone()),
      controller,
    }
  }

  /// Applies one pointer event. Returns the in-flight validation when the
  /// event completed a proposal. Must run inside a tokio runtime.
  pub fn handle(&mut self, event: PointerEvent) -> Option<PendingValidation> {
    match self.gestures.handle(event) {
      GestureOutcome::Started { source } => {
        self.controller.feedback().dispatch(
          FeedbackEvent::ConnectionStart { source },
          self.controller.complexity_level(),
        );
        None
      }
      GestureOutcome::Handoff(handoff) => self.controller.submit(handoff),
      GestureOutcome::Moved | GestureOutcome::Discarded | GestureOutcome::Ignored => None,
    }
  }

  /// The drag in progress, for drawing the rubber-band line.
  pub fn drag(&self) -> Option<&DragProposal> {
    self.gestures.proposal()
  }

  pub fn edges(&self) -> Vec<Edge> {
    self.controller.store().list_all()
  }

  pub fn store(&self) -> &EdgeStore {
    self.controller.store()
  }

  pub fn complexity_level(&self) -> u8 {
    self.controller.complexity_level()
  }

  pub fn controller(&self) -> &ReconciliationController {
    &self.controller
  }

  /// Drains `events` in order. Validations keep running after the stream
  /// ends; the handles of those still in flight are returned so callers can
  /// await them.
  #[instrument(level = "trace", skip(self, events))]
  pub async fn run<S>(mut self, events: S) -> Vec<PendingValidation>
  where
    S: Stream<Item = PointerEvent> + Unpin,
  {
    let mut events = events;
    let mut in_flight: Vec<PendingValidation> = Vec::new();
    let mut proposals = 0usize;
    while let Some(event) = events.next().await {
      if let Some(pending) = self.handle(event) {
        proposals += 1;
        in_flight.retain(|p| !p.is_finished());
        in_flight.push(pending);
      }
    }
    in_flight.retain(|p| !p.is_finished());
    info!(proposals, in_flight = in_flight.len(), "event queue closed");
    in_flight
  }

  /// Runs the session on its own task, fed by a channel.
  pub fn spawn(
    self,
    buffer: usize,
  ) -> (mpsc::Sender<PointerEvent>, JoinHandle<Vec<PendingValidation>>) {
    let (tx, rx) = mpsc::channel(buffer);
    let handle = tokio::spawn(self.run(ReceiverStream::new(rx)));
    (tx, handle)
  }
}
