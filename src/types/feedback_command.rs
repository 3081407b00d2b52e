//! Feedback events raised by the core and the commands they map to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Kind of feedback event, by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedbackKind {
  ConnectionStart,
  Success,
  Error,
  ConnectionLost,
  Completion,
  SessionOnline,
  BootstrapFailed,
}

impl FeedbackKind {
  pub fn as_str(self) -> &'static str {
    match self {
      FeedbackKind::ConnectionStart => "connection-start",
      FeedbackKind::Success => "success",
      FeedbackKind::Error => "error",
      FeedbackKind::ConnectionLost => "connection-lost",
      FeedbackKind::Completion => "completion",
      FeedbackKind::SessionOnline => "session-online",
      FeedbackKind::BootstrapFailed => "bootstrap-failed",
    }
  }

  pub const ALL: [FeedbackKind; 7] = [
    FeedbackKind::ConnectionStart,
    FeedbackKind::Success,
    FeedbackKind::Error,
    FeedbackKind::ConnectionLost,
    FeedbackKind::Completion,
    FeedbackKind::SessionOnline,
    FeedbackKind::BootstrapFailed,
  ];
}

impl fmt::Display for FeedbackKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Returned when a feedback kind name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feedback kind: {0}")]
pub struct UnknownFeedbackKind(pub String);

impl FromStr for FeedbackKind {
  type Err = UnknownFeedbackKind;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    FeedbackKind::ALL
      .into_iter()
      .find(|k| k.as_str() == s.trim())
      .ok_or_else(|| UnknownFeedbackKind(s.to_string()))
  }
}

/// A feedback event with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEvent {
  ConnectionStart { source: NodeId },
  Success { source: NodeId, target: NodeId },
  Error { logic_path: Option<String> },
  ConnectionLost { reason: String },
  Completion,
  SessionOnline { session_id: String },
  BootstrapFailed { reason: String },
}

impl FeedbackEvent {
  pub fn kind(&self) -> FeedbackKind {
    match self {
      FeedbackEvent::ConnectionStart { .. } => FeedbackKind::ConnectionStart,
      FeedbackEvent::Success { .. } => FeedbackKind::Success,
      FeedbackEvent::Error { .. } => FeedbackKind::Error,
      FeedbackEvent::ConnectionLost { .. } => FeedbackKind::ConnectionLost,
      FeedbackEvent::Completion => FeedbackKind::Completion,
      FeedbackEvent::SessionOnline { .. } => FeedbackKind::SessionOnline,
      FeedbackEvent::BootstrapFailed { .. } => FeedbackKind::BootstrapFailed,
    }
  }
}

/// Visual-state tag for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualCue {
  Drag,
  Success,
  Error,
  ConnectionLost,
  Complete,
  Online,
  Offline,
}

/// Audio cue tag for the sound collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioCue {
  Drone,
  Chime,
  Scrunch,
  Thud,
  Silence,
  Mute,
}

/// Opaque command consumed by rendering and audio collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackCommand {
  pub kind: FeedbackKind,
  pub visual_cue: VisualCue,
  pub audio_cue: AudioCue,
  /// Current complexity level, in `[0, 5]`.
  pub intensity: u8,
  /// Human-readable line for the console.
  pub message: Option<String>,
  pub is_error: bool,
}
