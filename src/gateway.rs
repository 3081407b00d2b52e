//! Validation gateway: the boundary to the remote reasoning oracle.
//!
//! One call, one attempt. No retry.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::config::EngineConfig;
use crate::error::GatewayError;
use crate::types::{ValidationRequest, Verdict};

/// Path of the validation endpoint under the API base.
pub const VALIDATE_EDGE_PATH: &str = "/validate-edge";

/// Asks the oracle whether a proposed edge holds.
#[async_trait]
pub trait ValidationGateway: Send + Sync {
  async fn validate(&self, request: &ValidationRequest) -> Result<Verdict, GatewayError>;
}

/// `user_edge` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEdge {
  pub source: String,
  pub target: String,
  pub relation: String,
}

/// `spatial_data` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialData {
  pub is_highest_node: bool,
  pub vertical_bias: bool,
}

/// Request body of `POST /validate-edge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateEdgeRequest {
  pub session_id: String,
  pub user_edge: WireEdge,
  pub thinking_time_ms: u64,
  pub spatial_data: SpatialData,
}

impl From<&ValidationRequest> for ValidateEdgeRequest {
  fn from(r: &ValidationRequest) -> Self {
    Self {
      session_id: r.session_id.clone(),
      user_edge: WireEdge {
        source: r.proposed_edge.source.clone(),
        target: r.proposed_edge.target.clone(),
        relation: r.proposed_edge.relation.to_string(),
      },
      thinking_time_ms: r.elapsed_thinking_time_ms,
      spatial_data: SpatialData {
        is_highest_node: r.spatial_hints.is_source_higher,
        vertical_bias: r.spatial_hints.is_vertical_bias,
      },
    }
  }
}

/// Builds the HTTP client shared by the gateway and the bootstrap.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
  reqwest::Client::builder().timeout(timeout).build()
}

/// Joins the API base and a path without doubling slashes.
pub(crate) fn endpoint(api_base: &str, path: &str) -> String {
  format!("{}{}", api_base.trim_end_matches('/'), path)
}

/// Oracle reached over HTTP with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpValidationGateway {
  client: reqwest::Client,
  url: String,
}

impl HttpValidationGateway {
  pub fn new(client: reqwest::Client, api_base: &str) -> Self {
    Self {
      client,
      url: endpoint(api_base, VALIDATE_EDGE_PATH),
    }
  }

  pub fn from_config(config: &EngineConfig) -> Result<Self, GatewayError> {
    let client = http_client(config.request_timeout)?;
    Ok(Self::new(client, &config.api_base))
  }

  pub fn url(&self) -> &str {
    &self.url
  }
}

#[async_trait]
impl ValidationGateway for HttpValidationGateway {
  #[instrument(level = "trace", skip(self, request), fields(url = %self.url))]
  async fn validate(&self, request: &ValidationRequest) -> Result<Verdict, GatewayError> {
    let body = ValidateEdgeRequest::from(request);
    let response = self.client.post(&self.url).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
      warn!(status = status.as_u16(), "oracle rejected the call");
      return Err(GatewayError::UnexpectedStatus(status.as_u16()));
    }
    Ok(response.json::<Verdict>().await?)
  }
}
