//! Engine configuration: defaults, overridable from the environment.

use std::time::Duration;

use crate::error::ConfigError;
use crate::types::RelationKind;

pub const DEFAULT_API_BASE: &str = "https://smart-core.onrender.com";
pub const DEFAULT_SESSION_ID: &str = "REL-OPP-002";
/// How long a rejected edge stays visible before it is evicted.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(800);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Vertical distance, in pixels, above which a proposal counts as vertical.
pub const DEFAULT_VERTICAL_BIAS_THRESHOLD: f64 = 50.0;
pub const DEFAULT_CONSOLE_CAPACITY: usize = 5;

pub const ENV_API_BASE: &str = "SYNAPSE_API_BASE_URL";
pub const ENV_SESSION_ID: &str = "SYNAPSE_SESSION_ID";
pub const ENV_GRACE_MS: &str = "SYNAPSE_GRACE_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "SYNAPSE_REQUEST_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
  pub api_base: String,
  pub session_id: String,
  pub grace_period: Duration,
  pub request_timeout: Duration,
  pub vertical_bias_threshold: f64,
  /// Relation attached to every drag proposal.
  pub default_relation: RelationKind,
  pub console_capacity: usize,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      api_base: DEFAULT_API_BASE.to_string(),
      session_id: DEFAULT_SESSION_ID.to_string(),
      grace_period: DEFAULT_GRACE_PERIOD,
      request_timeout: DEFAULT_REQUEST_TIMEOUT,
      vertical_bias_threshold: DEFAULT_VERTICAL_BIAS_THRESHOLD,
      default_relation: RelationKind::greater(),
      console_capacity: DEFAULT_CONSOLE_CAPACITY,
    }
  }
}

impl EngineConfig {
  /// Reads overrides from the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Reads overrides through `lookup`; unset or blank keys keep their default.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let mut config = Self::default();
    if let Some(v) = get(ENV_API_BASE) {
      config.api_base = v.trim().to_string();
    }
    if let Some(v) = get(ENV_SESSION_ID) {
      config.session_id = v.trim().to_string();
    }
    if let Some(v) = get(ENV_GRACE_MS) {
      config.grace_period = parse_millis(ENV_GRACE_MS, &v)?;
    }
    if let Some(v) = get(ENV_REQUEST_TIMEOUT_MS) {
      config.request_timeout = parse_millis(ENV_REQUEST_TIMEOUT_MS, &v)?;
    }
    Ok(config)
  }
}

fn parse_millis(key: &str, value: &str) -> Result<Duration, ConfigError> {
  value
    .trim()
    .parse::<u64>()
    .map(Duration::from_millis)
    .map_err(|_| ConfigError::InvalidNumber {
      key: key.to_string(),
      value: value.to_string(),
    })
}
