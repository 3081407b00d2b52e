//! Feedback dispatcher and sinks.
//!
//! The dispatcher is a stateless mapping from a [`FeedbackEvent`] and the
//! current complexity level to a [`FeedbackCommand`], fanned out to every
//! registered [`FeedbackSink`]. It never blocks and never fails.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::types::{
  AudioCue, FeedbackCommand, FeedbackEvent, FeedbackKind, MAX_COMPLEXITY, VisualCue,
};

/// One-way consumer of feedback commands (renderer, audio engine, console).
pub trait FeedbackSink: Send + Sync {
  fn on_feedback(&self, command: &FeedbackCommand);
}

fn cues(kind: FeedbackKind) -> (VisualCue, AudioCue, bool) {
  match kind {
    FeedbackKind::ConnectionStart => (VisualCue::Drag, AudioCue::Drone, false),
    FeedbackKind::Success => (VisualCue::Success, AudioCue::Chime, false),
    FeedbackKind::Error => (VisualCue::Error, AudioCue::Scrunch, true),
    FeedbackKind::ConnectionLost => (VisualCue::ConnectionLost, AudioCue::Silence, true),
    FeedbackKind::Completion => (VisualCue::Complete, AudioCue::Thud, false),
    FeedbackKind::SessionOnline => (VisualCue::Online, AudioCue::Mute, false),
    FeedbackKind::BootstrapFailed => (VisualCue::Offline, AudioCue::Mute, true),
  }
}

fn message(event: &FeedbackEvent) -> Option<String> {
  match event {
    FeedbackEvent::ConnectionStart { .. } => None,
    FeedbackEvent::Success { source, target } => {
      Some(format!("> CONNECTION ESTABLISHED: {source} -> {target}"))
    }
    FeedbackEvent::Error { logic_path } => Some(format!(
      "> LOGIC CONTRADICTION: {}",
      logic_path.as_deref().unwrap_or("no explanation given")
    )),
    FeedbackEvent::ConnectionLost { reason } => Some(format!("> CONNECTION LOST: {reason}")),
    FeedbackEvent::Completion => Some("> STRUCTURE COMPLETE.".to_string()),
    FeedbackEvent::SessionOnline { session_id } => {
      Some(format!("> SYSTEM ONLINE. SESSION: {session_id}"))
    }
    FeedbackEvent::BootstrapFailed { .. } => Some("> ERROR: CANNOT CONNECT TO CORE.".to_string()),
  }
}

fn build(kind: FeedbackKind, complexity: u8, message: Option<String>) -> FeedbackCommand {
  let (visual_cue, audio_cue, is_error) = cues(kind);
  FeedbackCommand {
    kind,
    visual_cue,
    audio_cue,
    intensity: complexity.min(MAX_COMPLEXITY),
    message,
    is_error,
  }
}

/// Maps an event to its command.
pub fn command_for(event: &FeedbackEvent, complexity: u8) -> FeedbackCommand {
  build(event.kind(), complexity, message(event))
}

/// Fans feedback commands out to sinks.
#[derive(Clone, Default)]
pub struct FeedbackDispatcher {
  sinks: Vec<Arc<dyn FeedbackSink>>,
}

impl FeedbackDispatcher {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_sink(mut self, sink: Arc<dyn FeedbackSink>) -> Self {
    self.sinks.push(sink);
    self
  }

  pub fn dispatch(&self, event: FeedbackEvent, complexity: u8) {
    let command = command_for(&event, complexity);
    self.emit(&command);
  }

  /// Dispatches by kind name, for collaborators that speak in tags.
  /// Unknown kinds are logged and dropped.
  pub fn dispatch_named(&self, kind: &str, complexity: u8, message: Option<String>) {
    match kind.parse::<FeedbackKind>() {
      Ok(kind) => self.emit(&build(kind, complexity, message)),
      Err(e) => warn!(error = %e, "dropping feedback"),
    }
  }

  fn emit(&self, command: &FeedbackCommand) {
    debug!(kind = %command.kind, intensity = command.intensity, "feedback");
    for sink in &self.sinks {
      sink.on_feedback(command);
    }
  }
}

/// Forwards commands into an unbounded channel. A closed receiver drops them.
pub struct ChannelSink {
  tx: UnboundedSender<FeedbackCommand>,
}

impl ChannelSink {
  pub fn new(tx: UnboundedSender<FeedbackCommand>) -> Self {
    Self { tx }
  }
}

impl FeedbackSink for ChannelSink {
  fn on_feedback(&self, command: &FeedbackCommand) {
    let _ = self.tx.send(command.clone());
  }
}

/// One console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
  pub text: String,
  pub is_error: bool,
}

/// Keeps the most recent human-readable feedback lines.
pub struct ConsoleLog {
  capacity: usize,
  entries: Mutex<VecDeque<ConsoleEntry>>,
}

impl ConsoleLog {
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      entries: Mutex::new(VecDeque::with_capacity(capacity)),
    }
  }

  /// Oldest first.
  pub fn entries(&self) -> Vec<ConsoleEntry> {
    self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .iter()
      .cloned()
      .collect()
  }
}

impl FeedbackSink for ConsoleLog {
  fn on_feedback(&self, command: &FeedbackCommand) {
    let Some(text) = command.message.clone() else {
      return;
    };
    if self.capacity == 0 {
      return;
    }
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    while entries.len() >= self.capacity {
      entries.pop_front();
    }
    entries.push_back(ConsoleEntry {
      text,
      is_error: command.is_error,
    });
  }
}

/// Records every command. Handy for embedding tests.
#[derive(Default)]
pub struct RecordingSink {
  commands: Mutex<Vec<FeedbackCommand>>,
}

impl RecordingSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn commands(&self) -> Vec<FeedbackCommand> {
    self
      .commands
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  pub fn kinds(&self) -> Vec<FeedbackKind> {
    self.commands().into_iter().map(|c| c.kind).collect()
  }
}

impl FeedbackSink for RecordingSink {
  fn on_feedback(&self, command: &FeedbackCommand) {
    self
      .commands
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(command.clone());
  }
}
