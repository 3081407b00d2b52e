//! Tests for `ReconciliationController`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::bootstrap::staggered_position;
use crate::config::EngineConfig;
use crate::controller::{ReconciliationController, Settlement};
use crate::edge_store::EdgeStore;
use crate::error::GatewayError;
use crate::feedback::{FeedbackDispatcher, RecordingSink};
use crate::gateway::ValidationGateway;
use crate::gesture::Handoff;
use crate::node_registry::NodeRegistry;
use crate::types::{
  EdgeStatus, FeedbackKind, Node, SessionContext, ValidationRequest, Verdict, VisualCue,
};

#[derive(Clone)]
enum Reply {
  Answer(Verdict),
  Down,
  Panic,
}

/// Answers per directed pair after an optional delay; valid by default.
#[derive(Default)]
struct ScriptedGateway {
  script: Mutex<HashMap<(String, String), (Duration, Reply)>>,
  seen: Mutex<Vec<ValidationRequest>>,
}

impl ScriptedGateway {
  fn on(self, source: &str, target: &str, delay_ms: u64, reply: Reply) -> Self {
    self.script.lock().unwrap().insert(
      (source.to_string(), target.to_string()),
      (Duration::from_millis(delay_ms), reply),
    );
    self
  }

  fn seen(&self) -> Vec<ValidationRequest> {
    self.seen.lock().unwrap().clone()
  }
}

#[async_trait]
impl ValidationGateway for ScriptedGateway {
  async fn validate(&self, request: &ValidationRequest) -> Result<Verdict, GatewayError> {
    self.seen.lock().unwrap().push(request.clone());
    let key = (
      request.proposed_edge.source.clone(),
      request.proposed_edge.target.clone(),
    );
    let (delay, reply) = self
      .script
      .lock()
      .unwrap()
      .get(&key)
      .cloned()
      .unwrap_or((Duration::ZERO, Reply::Answer(Verdict::valid())));
    tokio::time::sleep(delay).await;
    match reply {
      Reply::Answer(v) => Ok(v),
      Reply::Down => Err(GatewayError::UnexpectedStatus(503)),
      Reply::Panic => panic!("gateway bug"),
    }
  }
}

struct Harness {
  controller: ReconciliationController,
  gateway: Arc<ScriptedGateway>,
  sink: Arc<RecordingSink>,
}

fn harness(gateway: ScriptedGateway) -> Harness {
  let registry = NodeRegistry::new();
  registry
    .load(
      (1..=8)
        .map(|i| {
          let (x, y) = staggered_position(i - 1);
          Node::new(format!("N{i}"), x, y)
        })
        .collect(),
    )
    .unwrap();
  let gateway = Arc::new(gateway);
  let sink = Arc::new(RecordingSink::new());
  let controller = ReconciliationController::new(
    Arc::new(registry),
    Arc::new(EdgeStore::new()),
    gateway.clone(),
    FeedbackDispatcher::new().with_sink(sink.clone()),
    SessionContext::new("S-TEST"),
    &EngineConfig::default(),
  );
  Harness {
    controller,
    gateway,
    sink,
  }
}

fn handoff(source: &str, target: &str) -> Handoff {
  Handoff {
    source: source.to_string(),
    target: target.to_string(),
  }
}

#[tokio::test(start_paused = true)]
async fn valid_verdict_confirms_edge_and_raises_complexity() {
  let h = harness(ScriptedGateway::default());
  let pending = h.controller.submit(handoff("N1", "N2")).unwrap();
  assert_eq!(
    h.controller.store().get(&pending.edge_id).unwrap().status,
    EdgeStatus::Pending
  );

  let edge_id = pending.edge_id.clone();
  let settlement = pending.settled().await.unwrap();
  assert!(matches!(
    settlement,
    Settlement::Valid {
      complexity_level: 1,
      ..
    }
  ));
  assert_eq!(
    h.controller.store().get(&edge_id).unwrap().status,
    EdgeStatus::Valid
  );
  assert_eq!(h.controller.complexity_level(), 1);

  let commands = h.sink.commands();
  assert_eq!(commands.len(), 1);
  assert_eq!(commands[0].kind, FeedbackKind::Success);
  assert_eq!(commands[0].visual_cue, VisualCue::Success);
  assert_eq!(commands[0].intensity, 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_verdict_marks_rejected_then_evicts_after_grace() {
  let h = harness(ScriptedGateway::default().on(
    "N1",
    "N2",
    0,
    Reply::Answer(Verdict::rejected("N2 cannot precede N1")),
  ));
  let pending = h.controller.submit(handoff("N1", "N2")).unwrap();
  let edge_id = pending.edge_id.clone();
  let settlement = pending.settled().await.unwrap();

  assert_eq!(
    settlement,
    Settlement::Rejected {
      edge: h.controller.store().get(&edge_id).unwrap(),
      logic_path: Some("N2 cannot precede N1".to_string()),
    }
  );
  assert_eq!(settlement.edge().status, EdgeStatus::Rejected);
  assert_eq!(h.controller.complexity_level(), 0);

  let commands = h.sink.commands();
  assert_eq!(commands.len(), 1);
  assert_eq!(commands[0].kind, FeedbackKind::Error);
  assert!(commands[0]
    .message
    .as_deref()
    .unwrap()
    .contains("N2 cannot precede N1"));

  tokio::time::sleep(Duration::from_millis(700)).await;
  assert!(h.controller.store().get(&edge_id).is_some());
  tokio::time::sleep(Duration::from_millis(101)).await;
  assert!(h.controller.store().list_all().is_empty());
}

#[tokio::test(start_paused = true)]
async fn duplicate_proposal_on_pending_pair_is_dropped() {
  let h = harness(ScriptedGateway::default().on(
    "N1",
    "N2",
    300,
    Reply::Answer(Verdict::valid()),
  ));
  let first = h.controller.submit(handoff("N1", "N2")).unwrap();
  assert!(h.controller.submit(handoff("N1", "N2")).is_none());
  assert!(h.controller.submit(handoff("N2", "N1")).is_none());

  let pending: Vec<_> = h
    .controller
    .store()
    .list_all()
    .into_iter()
    .filter(|e| e.status == EdgeStatus::Pending)
    .collect();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].id, first.edge_id);

  first.settled().await.unwrap();
  assert_eq!(h.gateway.seen().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn self_loop_is_dropped_without_call_or_feedback() {
  let h = harness(ScriptedGateway::default());
  assert!(h.controller.submit(handoff("N1", "N1")).is_none());
  tokio::task::yield_now().await;
  assert!(h.controller.store().is_empty());
  assert!(h.gateway.seen().is_empty());
  assert!(h.sink.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_node_is_dropped() {
  let h = harness(ScriptedGateway::default());
  assert!(h.controller.submit(handoff("N1", "ghost")).is_none());
  assert!(h.controller.store().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unreachable_gateway_fails_closed() {
  let h = harness(ScriptedGateway::default().on("N1", "N2", 0, Reply::Down));
  let pending = h.controller.submit(handoff("N1", "N2")).unwrap();
  let edge_id = pending.edge_id.clone();
  let settlement = pending.settled().await.unwrap();

  assert!(matches!(settlement, Settlement::ConnectionLost { .. }));
  assert_eq!(
    h.controller.store().get(&edge_id).unwrap().status,
    EdgeStatus::Rejected
  );
  assert_eq!(h.sink.kinds(), vec![FeedbackKind::ConnectionLost]);
  assert_eq!(h.controller.complexity_level(), 0);

  tokio::time::sleep(Duration::from_millis(801)).await;
  assert!(h.controller.store().is_empty());
}

#[tokio::test(start_paused = true)]
async fn settlements_follow_response_order() {
  let h = harness(
    ScriptedGateway::default()
      .on("N1", "N2", 500, Reply::Answer(Verdict::valid()))
      .on("N3", "N4", 100, Reply::Answer(Verdict::valid())),
  );
  let slow = h.controller.submit(handoff("N1", "N2")).unwrap();
  let fast = h.controller.submit(handoff("N3", "N4")).unwrap();

  let fast = fast.settled().await.unwrap();
  assert!(matches!(
    fast,
    Settlement::Valid {
      complexity_level: 1,
      ..
    }
  ));
  assert_eq!(
    h.controller.store().get(&slow.edge_id).unwrap().status,
    EdgeStatus::Pending
  );
  let slow = slow.settled().await.unwrap();
  assert!(matches!(
    slow,
    Settlement::Valid {
      complexity_level: 2,
      ..
    }
  ));

  let messages: Vec<_> = h
    .sink
    .commands()
    .into_iter()
    .filter_map(|c| c.message)
    .collect();
  assert_eq!(
    messages,
    vec![
      "> CONNECTION ESTABLISHED: N3 -> N4".to_string(),
      "> CONNECTION ESTABLISHED: N1 -> N2".to_string(),
    ]
  );
}

#[tokio::test(start_paused = true)]
async fn complexity_caps_at_five_and_completion_fires_once() {
  let h = harness(ScriptedGateway::default());
  let mut levels = Vec::new();
  for i in 1..=7 {
    let p = h
      .controller
      .submit(handoff(&format!("N{i}"), &format!("N{}", i + 1)))
      .unwrap();
    if let Settlement::Valid {
      complexity_level, ..
    } = p.settled().await.unwrap()
    {
      levels.push(complexity_level);
    }
  }
  assert_eq!(levels, vec![1, 2, 3, 4, 5, 5, 5]);

  let kinds = h.sink.kinds();
  assert_eq!(
    kinds.iter().filter(|k| **k == FeedbackKind::Completion).count(),
    1
  );
  let completion_at = kinds
    .iter()
    .position(|k| *k == FeedbackKind::Completion)
    .unwrap();
  assert_eq!(kinds[completion_at - 1], FeedbackKind::Success);
  assert!(h.sink.commands().iter().all(|c| c.intensity <= 5));
}

#[tokio::test(start_paused = true)]
async fn request_carries_thinking_time_and_spatial_hints() {
  let h = harness(ScriptedGateway::default());
  tokio::time::advance(Duration::from_millis(2_000)).await;
  h.controller
    .submit(handoff("N1", "N2"))
    .unwrap()
    .settled()
    .await
    .unwrap();

  let seen = h.gateway.seen();
  assert_eq!(seen.len(), 1);
  let r = &seen[0];
  assert_eq!(r.session_id, "S-TEST");
  assert_eq!(r.proposed_edge.relation.as_str(), "GREATER");
  assert_eq!(r.elapsed_thinking_time_ms, 2_000);
  assert!(r.spatial_hints.is_source_higher);
  assert!(!r.spatial_hints.is_vertical_bias);
}

#[tokio::test(start_paused = true)]
async fn valid_edge_is_never_revalidated() {
  let h = harness(ScriptedGateway::default());
  h.controller
    .submit(handoff("N1", "N2"))
    .unwrap()
    .settled()
    .await
    .unwrap();
  assert!(h.controller.submit(handoff("N1", "N2")).is_none());
  assert_eq!(h.gateway.seen().len(), 1);
  assert_eq!(h.controller.complexity_level(), 1);
}

#[tokio::test(start_paused = true)]
async fn pair_can_be_retried_after_rejection() {
  let h = harness(ScriptedGateway::default().on("N1", "N2", 0, Reply::Down));
  h.controller
    .submit(handoff("N1", "N2"))
    .unwrap()
    .settled()
    .await
    .unwrap();
  let retry = h.controller.submit(handoff("N1", "N2"));
  assert!(retry.is_some());
}

#[tokio::test(start_paused = true)]
async fn panicking_gateway_fails_closed_and_frees_the_pair() {
  let h = harness(ScriptedGateway::default().on("N1", "N2", 0, Reply::Panic));
  let pending = h.controller.submit(handoff("N1", "N2")).unwrap();
  let edge_id = pending.edge_id.clone();
  let settlement = pending.settled().await.unwrap();

  match settlement {
    Settlement::ConnectionLost { reason, .. } => assert!(reason.contains("gateway bug")),
    other => panic!("expected connection lost, got {other:?}"),
  }
  assert_eq!(
    h.controller.store().get(&edge_id).unwrap().status,
    EdgeStatus::Rejected
  );
  assert_eq!(h.sink.kinds(), vec![FeedbackKind::ConnectionLost]);

  tokio::time::sleep(Duration::from_millis(801)).await;
  assert!(h.controller.store().is_empty());
  assert!(h.controller.submit(handoff("N1", "N2")).is_some());
}
