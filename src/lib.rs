//! # synapse-weave
//!
//! Drag-to-connect logic graphs with optimistic edges.
//!
//! A user drags from one logic node to another; the edge is drawn at once as
//! `Pending`, validated by a remote reasoning oracle, then either confirmed
//! (`Valid`) or rolled back (`Rejected`, evicted after a grace period) with
//! feedback for the renderer and audio collaborators.
//!
//! ## Architecture
//!
//! - [`node_registry`]: nodes and positions, loaded once.
//! - [`edge_store`]: owns every edge; atomic duplicate check on proposal.
//! - [`gesture`]: pointer events to proposals (`Idle` / `Dragging`).
//! - [`gateway`]: the oracle boundary, HTTP implementation included.
//! - [`controller`]: proposal -> validate -> settle, one task per proposal.
//! - [`feedback`]: settlement outcomes to visual/audio tags and console lines.
//! - [`session`] and [`bootstrap`]: wiring and seeding.

pub mod bootstrap;
pub mod config;
pub mod controller;
#[cfg(test)]
mod controller_test;
pub mod edge_store;
pub mod error;
pub mod feedback;
pub mod gateway;
pub mod gesture;
pub mod node_registry;
pub mod session;
pub mod types;

pub use bootstrap::{SessionSeed, session_from_seed, start_session};
pub use config::EngineConfig;
pub use controller::{PendingValidation, ReconciliationController, Settlement};
pub use edge_store::{EdgeStore, Resolution};
pub use feedback::{FeedbackDispatcher, FeedbackSink};
pub use gateway::{HttpValidationGateway, ValidationGateway};
pub use gesture::{GestureOutcome, GestureStateMachine, PointerEvent};
pub use node_registry::NodeRegistry;
pub use session::Session;
pub use types::{Edge, EdgeStatus, FeedbackCommand, Node, RelationKind, Verdict};
