//! A logic node on the canvas.

use serde::{Deserialize, Serialize};

/// Stable node identity for the lifetime of a session.
pub type NodeId = String;

/// Screen-space position. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// A logic node. Immutable once the registry is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: NodeId,
  pub x: f64,
  pub y: f64,
}

impl Node {
  pub fn new(id: impl Into<NodeId>, x: f64, y: f64) -> Self {
    Self {
      id: id.into(),
      x,
      y,
    }
  }

  pub fn position(&self) -> Point {
    Point::new(self.x, self.y)
  }
}
