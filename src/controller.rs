//! Reconciliation controller: proposal -> validate -> settle.
//!
//! Every proposal that reaches `Pending` gets its own task. The task awaits
//! the oracle, settles the edge exactly once, and raises feedback. Proposals
//! never wait on each other, so settlements follow gateway response order.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::EngineConfig;
use crate::edge_store::{EdgeStore, Resolution};
use crate::error::{GatewayError, ReconcileError, StoreError};
use crate::feedback::FeedbackDispatcher;
use crate::gateway::ValidationGateway;
use crate::gesture::Handoff;
use crate::node_registry::NodeRegistry;
use crate::types::{
  Edge, EdgeId, FeedbackEvent, MAX_COMPLEXITY, ProposedEdge, RelationKind, SessionContext,
  SpatialHints, ValidationRequest, Verdict,
};

/// Terminal result of one proposal.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
  /// Oracle accepted the edge.
  Valid { edge: Edge, complexity_level: u8 },
  /// Oracle rejected the edge.
  Rejected {
    edge: Edge,
    logic_path: Option<String>,
  },
  /// Oracle could not be reached; the edge failed closed to `Rejected`.
  ConnectionLost { edge: Edge, reason: String },
}

impl Settlement {
  pub fn edge(&self) -> &Edge {
    match self {
      Settlement::Valid { edge, .. }
      | Settlement::Rejected { edge, .. }
      | Settlement::ConnectionLost { edge, .. } => edge,
    }
  }

  pub fn resolution(&self) -> Resolution {
    match self {
      Settlement::Valid { .. } => Resolution::Valid,
      Settlement::Rejected { .. } | Settlement::ConnectionLost { .. } => Resolution::Rejected,
    }
  }
}

/// A proposal whose validation is in flight.
#[derive(Debug)]
pub struct PendingValidation {
  pub edge_id: EdgeId,
  handle: JoinHandle<Result<Settlement, StoreError>>,
}

impl PendingValidation {
  /// Whether the validation task has finished.
  pub fn is_finished(&self) -> bool {
    self.handle.is_finished()
  }

  /// Waits for the settlement. Dropping the handle instead does not cancel
  /// the validation.
  pub async fn settled(self) -> Result<Settlement, ReconcileError> {
    Ok(self.handle.await??)
  }
}

struct Inner {
  registry: Arc<NodeRegistry>,
  store: Arc<EdgeStore>,
  context: Mutex<SessionContext>,
  gateway: Arc<dyn ValidationGateway>,
  feedback: FeedbackDispatcher,
  relation: RelationKind,
  grace_period: Duration,
  vertical_bias_threshold: f64,
}

impl Inner {
  fn context(&self) -> MutexGuard<'_, SessionContext> {
    self.context.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn complexity_level(&self) -> u8 {
    self.context().complexity_level()
  }

  fn settle(
    self: &Arc<Self>,
    edge_id: &str,
    verdict: Result<Verdict, GatewayError>,
  ) -> Result<Settlement, StoreError> {
    match verdict {
      Ok(Verdict { is_valid: true, .. }) => {
        let edge = self.store.settle(edge_id, Resolution::Valid)?;
        let (before, after) = {
          let mut ctx = self.context();
          let before = ctx.complexity_level();
          (before, ctx.raise_complexity())
        };
        info!(
          edge_id,
          source = %edge.source,
          target = %edge.target,
          complexity_level = after,
          "edge accepted"
        );
        self.feedback.dispatch(
          FeedbackEvent::Success {
            source: edge.source.clone(),
            target: edge.target.clone(),
          },
          after,
        );
        if before < MAX_COMPLEXITY && after == MAX_COMPLEXITY {
          self.feedback.dispatch(FeedbackEvent::Completion, after);
        }
        Ok(Settlement::Valid {
          edge,
          complexity_level: after,
        })
      }
      Ok(Verdict { logic_path, .. }) => {
        let edge = self.store.settle(edge_id, Resolution::Rejected)?;
        info!(edge_id, logic_path = ?logic_path, "edge rejected by oracle");
        self.feedback.dispatch(
          FeedbackEvent::Error {
            logic_path: logic_path.clone(),
          },
          self.complexity_level(),
        );
        self.schedule_eviction(edge.id.clone());
        Ok(Settlement::Rejected { edge, logic_path })
      }
      Err(e) => {
        warn!(edge_id, error = %e, "oracle unreachable, failing edge closed");
        let edge = self.store.settle(edge_id, Resolution::Rejected)?;
        let reason = e.to_string();
        self.feedback.dispatch(
          FeedbackEvent::ConnectionLost {
            reason: reason.clone(),
          },
          self.complexity_level(),
        );
        self.schedule_eviction(edge.id.clone());
        Ok(Settlement::ConnectionLost { edge, reason })
      }
    }
  }

  fn schedule_eviction(self: &Arc<Self>, edge_id: EdgeId) {
    let store = self.store.clone();
    let grace = self.grace_period;
    tokio::spawn(async move {
      tokio::time::sleep(grace).await;
      match store.evict(&edge_id) {
        Ok(_) => debug!(edge_id = %edge_id, "rejected edge evicted"),
        Err(e) => error!(error = %e, "eviction failed"),
      }
    });
  }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
  panic
    .downcast_ref::<&str>()
    .map(|s| s.to_string())
    .or_else(|| panic.downcast_ref::<String>().cloned())
    .unwrap_or_else(|| "unknown panic".to_string())
}

/// Orchestrates proposals between the gesture machine, the edge store, the
/// gateway and the feedback dispatcher. Cheap to clone.
#[derive(Clone)]
pub struct ReconciliationController {
  inner: Arc<Inner>,
}

impl ReconciliationController {
  pub fn new(
    registry: Arc<NodeRegistry>,
    store: Arc<EdgeStore>,
    gateway: Arc<dyn ValidationGateway>,
    feedback: FeedbackDispatcher,
    context: SessionContext,
    config: &EngineConfig,
  ) -> Self {
    Self {
      inner: Arc::new(Inner {
        registry,
        store,
        context: Mutex::new(context),
        gateway,
        feedback,
        relation: config.default_relation.clone(),
        grace_period: config.grace_period,
        vertical_bias_threshold: config.vertical_bias_threshold,
      }),
    }
  }

  /// Starts reconciliation of a dropped drag. Must run inside a tokio runtime.
  ///
  /// Returns `None` when the proposal is aborted silently: unknown nodes,
  /// self-loops, a pair already in flight, or an edge that is already valid.
  #[instrument(level = "trace", skip(self))]
  pub fn submit(&self, handoff: Handoff) -> Option<PendingValidation> {
    let inner = &self.inner;
    let (source, target) = match (
      inner.registry.get(&handoff.source),
      inner.registry.get(&handoff.target),
    ) {
      (Ok(s), Ok(t)) => (s, t),
      (Err(e), _) | (_, Err(e)) => {
        debug!(error = %e, "proposal aborted");
        return None;
      }
    };
    let spatial_hints = SpatialHints::between(source, target, inner.vertical_bias_threshold);

    let edge_id = match inner
      .store
      .propose_pending(&source.id, &target.id, inner.relation.clone())
    {
      Ok(id) => id,
      Err(e) if e.is_gesture_error() => {
        debug!(error = %e, "proposal aborted");
        return None;
      }
      Err(e) => {
        error!(error = %e, "proposal failed");
        return None;
      }
    };

    let request = {
      let ctx = inner.context();
      ValidationRequest {
        session_id: ctx.session_id.clone(),
        proposed_edge: ProposedEdge {
          source: source.id.clone(),
          target: target.id.clone(),
          relation: inner.relation.clone(),
        },
        elapsed_thinking_time_ms: ctx.elapsed_ms(),
        spatial_hints,
      }
    };
    info!(edge_id = %edge_id, source = %source.id, target = %target.id, "validating proposal");

    let task_inner = inner.clone();
    let task_edge_id = edge_id.clone();
    let handle = tokio::spawn(async move {
      let verdict = AssertUnwindSafe(task_inner.gateway.validate(&request))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
          Err(GatewayError::Panicked(panic_message(panic.as_ref())))
        });
      task_inner.settle(&task_edge_id, verdict)
    });
    Some(PendingValidation { edge_id, handle })
  }

  pub fn store(&self) -> &Arc<EdgeStore> {
    &self.inner.store
  }

  pub fn registry(&self) -> &Arc<NodeRegistry> {
    &self.inner.registry
  }

  pub fn feedback(&self) -> &FeedbackDispatcher {
    &self.inner.feedback
  }

  pub fn complexity_level(&self) -> u8 {
    self.inner.complexity_level()
  }

  pub fn session_id(&self) -> String {
    self.inner.context().session_id.clone()
  }
}
