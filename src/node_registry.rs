//! Immutable-after-load set of node identities and positions.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::{info, instrument};

use crate::error::RegistryError;
use crate::types::Node;

#[derive(Debug)]
struct Loaded {
  nodes: Vec<Node>,
  index: HashMap<String, usize>,
}

/// Immutable-after-load set of node identities and positions.
///
/// Shared by reference; loading goes through `&self` and succeeds exactly once.
#[derive(Debug, Default)]
pub struct NodeRegistry {
  loaded: OnceLock<Loaded>,
}

impl NodeRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Loads the session's nodes. Fails with `AlreadyLoaded` on a second call.
  #[instrument(level = "trace", skip(self, nodes), fields(count = nodes.len()))]
  pub fn load(&self, nodes: Vec<Node>) -> Result<(), RegistryError> {
    if self.is_loaded() {
      return Err(RegistryError::AlreadyLoaded);
    }
    let mut index = HashMap::with_capacity(nodes.len());
    for (i, n) in nodes.iter().enumerate() {
      if index.insert(n.id.clone(), i).is_some() {
        return Err(RegistryError::DuplicateNode(n.id.clone()));
      }
    }
    let count = nodes.len();
    self
      .loaded
      .set(Loaded { nodes, index })
      .map_err(|_| RegistryError::AlreadyLoaded)?;
    info!(count, "node registry loaded");
    Ok(())
  }

  pub fn is_loaded(&self) -> bool {
    self.loaded.get().is_some()
  }

  pub fn get(&self, id: &str) -> Result<&Node, RegistryError> {
    self
      .loaded
      .get()
      .and_then(|l| l.index.get(id).map(|&i| &l.nodes[i]))
      .ok_or_else(|| RegistryError::NotFound(id.to_string()))
  }

  pub fn contains(&self, id: &str) -> bool {
    self.get(id).is_ok()
  }

  /// All nodes in load order.
  pub fn nodes(&self) -> &[Node] {
    self.loaded.get().map(|l| l.nodes.as_slice()).unwrap_or(&[])
  }
}
