//! Session-wide state that outlives individual proposals.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Upper bound of [`SessionContext::complexity_level`].
pub const MAX_COMPLEXITY: u8 = 5;

/// Session-wide state that outlives individual proposals.
#[derive(Debug, Clone)]
pub struct SessionContext {
  pub session_id: String,
  /// Wall-clock start, for display and logs.
  pub started_at: DateTime<Utc>,
  /// Monotonic start, for thinking-time measurement.
  started: Instant,
  complexity_level: u8,
}

impl SessionContext {
  pub fn new(session_id: impl Into<String>) -> Self {
    Self {
      session_id: session_id.into(),
      started_at: Utc::now(),
      started: Instant::now(),
      complexity_level: 0,
    }
  }

  pub fn complexity_level(&self) -> u8 {
    self.complexity_level
  }

  /// Raises the complexity level by one, saturating at [`MAX_COMPLEXITY`].
  /// Returns the new level.
  pub fn raise_complexity(&mut self) -> u8 {
    self.complexity_level = (self.complexity_level + 1).min(MAX_COMPLEXITY);
    self.complexity_level
  }

  /// Milliseconds since session start.
  pub fn elapsed_ms(&self) -> u64 {
    u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
  }
}
