//! Session bootstrap: fetch the seed, lay out nodes, load registry and
//! static premises.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, instrument};

use crate::config::EngineConfig;
use crate::controller::ReconciliationController;
use crate::edge_store::EdgeStore;
use crate::error::BootstrapError;
use crate::feedback::FeedbackDispatcher;
use crate::gateway::{ValidationGateway, endpoint};
use crate::node_registry::NodeRegistry;
use crate::session::Session;
use crate::types::{Edge, FeedbackEvent, Node, RelationKind, SessionContext};

/// A premise from a prior session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Premise {
  pub source: String,
  pub target: String,
  pub relation: RelationKind,
}

/// Response of `GET /session/new/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSeed {
  pub nodes: Vec<String>,
  /// Absent and `null` both mean no premises.
  #[serde(default, deserialize_with = "null_as_empty")]
  pub premises: Vec<Premise>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Premise>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<Vec<Premise>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Position of the `i`-th node: a horizontal line, every other node dropped 50px.
pub fn staggered_position(i: usize) -> (f64, f64) {
  let x = 100.0 + 150.0 * i as f64;
  let y = 200.0 + 50.0 * (i % 2) as f64;
  (x, y)
}

impl SessionSeed {
  pub fn layout_nodes(&self) -> Vec<Node> {
    self
      .nodes
      .iter()
      .enumerate()
      .map(|(i, id)| {
        let (x, y) = staggered_position(i);
        Node::new(id.clone(), x, y)
      })
      .collect()
  }

  pub fn premise_edges(&self) -> Vec<Edge> {
    self
      .premises
      .iter()
      .enumerate()
      .map(|(i, p)| {
        Edge::premise(
          format!("premise-{i}"),
          p.source.clone(),
          p.target.clone(),
          p.relation.clone(),
        )
      })
      .collect()
  }
}

/// Fetches the seed for `session_id`. One attempt.
#[instrument(level = "trace", skip(client))]
pub async fn fetch_seed(
  client: &reqwest::Client,
  api_base: &str,
  session_id: &str,
) -> Result<SessionSeed, BootstrapError> {
  let url = endpoint(api_base, &format!("/session/new/{session_id}"));
  let response = client.get(&url).send().await?;
  let status = response.status();
  if !status.is_success() {
    return Err(BootstrapError::UnexpectedStatus(status.as_u16()));
  }
  Ok(response.json::<SessionSeed>().await?)
}

/// Builds a session from an already fetched seed. The session clock starts here.
pub fn session_from_seed(
  seed: &SessionSeed,
  config: &EngineConfig,
  gateway: Arc<dyn ValidationGateway>,
  feedback: FeedbackDispatcher,
) -> Result<Session, BootstrapError> {
  let registry = Arc::new(NodeRegistry::new());
  registry.load(seed.layout_nodes())?;
  let store = Arc::new(EdgeStore::new());
  let premises = store.insert_static(seed.premise_edges())?;

  let context = SessionContext::new(config.session_id.clone());
  info!(
    session_id = %config.session_id,
    started_at = %context.started_at.to_rfc3339(),
    nodes = registry.nodes().len(),
    premises,
    "session seeded"
  );
  let controller = ReconciliationController::new(
    registry,
    store,
    gateway,
    feedback.clone(),
    context,
    config,
  );
  feedback.dispatch(
    FeedbackEvent::SessionOnline {
      session_id: config.session_id.clone(),
    },
    0,
  );
  Ok(Session::new(controller))
}

/// Fetches the seed and builds the session. On failure a `BootstrapFailed`
/// feedback is raised before the error is returned.
pub async fn start_session(
  client: &reqwest::Client,
  config: &EngineConfig,
  gateway: Arc<dyn ValidationGateway>,
  feedback: FeedbackDispatcher,
) -> Result<Session, BootstrapError> {
  let seeded = match fetch_seed(client, &config.api_base, &config.session_id).await {
    Ok(seed) => session_from_seed(&seed, config, gateway, feedback.clone()),
    Err(e) => Err(e),
  };
  if let Err(e) = &seeded {
    error!(error = %e, "session bootstrap failed");
    feedback.dispatch(
      FeedbackEvent::BootstrapFailed {
        reason: e.to_string(),
      },
      0,
    );
  }
  seeded
}
