//! Optimistic edge store.
//!
//! Owns every edge of the session. Each operation runs under one lock, so
//! the duplicate check in [`EdgeStore::propose_pending`] and the insert that
//! follows are a single step.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{Edge, EdgeId, EdgeStatus, NodeId, RelationKind};

/// Terminal outcome of a pending edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  Valid,
  Rejected,
}

impl From<Resolution> for EdgeStatus {
  fn from(r: Resolution) -> Self {
    match r {
      Resolution::Valid => EdgeStatus::Valid,
      Resolution::Rejected => EdgeStatus::Rejected,
    }
  }
}

/// Unordered node pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PairKey(NodeId, NodeId);

impl PairKey {
  fn new(a: &str, b: &str) -> Self {
    if a <= b {
      Self(a.to_string(), b.to_string())
    } else {
      Self(b.to_string(), a.to_string())
    }
  }
}

#[derive(Debug, Default)]
struct EdgeTable {
  /// Insertion order.
  edges: Vec<Edge>,
  pending: HashMap<PairKey, EdgeId>,
}

impl EdgeTable {
  fn position(&self, edge_id: &str) -> Option<usize> {
    self.edges.iter().position(|e| e.id == edge_id)
  }

  /// Whether the exact directed relation is already valid.
  fn has_valid(&self, source: &str, target: &str, relation: &RelationKind) -> bool {
    self.edges.iter().any(|e| {
      e.status == EdgeStatus::Valid
        && e.source == source
        && e.target == target
        && &e.relation == relation
    })
  }
}

/// Optimistic edge store. See the module docs.
#[derive(Debug, Default)]
pub struct EdgeStore {
  table: Mutex<EdgeTable>,
}

impl EdgeStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn table(&self) -> MutexGuard<'_, EdgeTable> {
    self.table.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Bulk-adds edges from a prior session as static `Valid` edges and
  /// returns how many were added.
  ///
  /// Nothing is inserted if any edge is a self-loop or reuses an id already in
  /// the store or in the batch. Edges that repeat a valid directed relation
  /// are skipped.
  #[instrument(level = "trace", skip(self, edges), fields(count = edges.len()))]
  pub fn insert_static(&self, edges: Vec<Edge>) -> Result<usize, StoreError> {
    if let Some(e) = edges.iter().find(|e| e.source == e.target) {
      return Err(StoreError::SelfLoop(e.source.clone()));
    }
    let mut table = self.table();
    let mut ids: HashSet<&str> = table.edges.iter().map(|e| e.id.as_str()).collect();
    if let Some(e) = edges.iter().find(|e| !ids.insert(e.id.as_str())) {
      return Err(StoreError::DuplicateEdgeId(e.id.clone()));
    }
    drop(ids);

    let mut added = 0;
    for edge in edges {
      if table.has_valid(&edge.source, &edge.target, &edge.relation) {
        debug!(edge_id = %edge.id, "premise already valid, skipped");
        continue;
      }
      table.edges.push(Edge {
        status: EdgeStatus::Valid,
        is_static: true,
        ..edge
      });
      added += 1;
    }
    Ok(added)
  }

  /// Inserts a `Pending` edge and returns its id.
  ///
  /// Fails with `SelfLoop` when `source == target`, with `DuplicatePending`
  /// when the unordered pair already has an edge in flight, and with
  /// `AlreadyValid` when the exact same directed relation is already valid.
  #[instrument(level = "trace", skip(self))]
  pub fn propose_pending(
    &self,
    source: &str,
    target: &str,
    relation: RelationKind,
  ) -> Result<EdgeId, StoreError> {
    if source == target {
      return Err(StoreError::SelfLoop(source.to_string()));
    }
    let key = PairKey::new(source, target);
    let mut table = self.table();
    if table.pending.contains_key(&key) {
      return Err(StoreError::DuplicatePending {
        from: source.to_string(),
        to: target.to_string(),
      });
    }
    if table.has_valid(source, target, &relation) {
      return Err(StoreError::AlreadyValid {
        from: source.to_string(),
        to: target.to_string(),
      });
    }

    let id = format!("edge-{}", Uuid::new_v4());
    table.pending.insert(key, id.clone());
    table.edges.push(Edge {
      id: id.clone(),
      source: source.to_string(),
      target: target.to_string(),
      relation,
      status: EdgeStatus::Pending,
      is_static: false,
    });
    debug!(edge_id = %id, "edge pending");
    Ok(id)
  }

  /// Moves a `Pending` edge to its terminal status. `Rejected` edges stay
  /// readable until [`EdgeStore::evict`] removes them.
  #[instrument(level = "trace", skip(self))]
  pub fn settle(&self, edge_id: &str, resolution: Resolution) -> Result<Edge, StoreError> {
    let mut table = self.table();
    let Some(pos) = table.position(edge_id) else {
      error!(edge_id, "settle on unknown edge");
      return Err(StoreError::NotPending {
        edge_id: edge_id.to_string(),
        status: None,
      });
    };
    let status = table.edges[pos].status;
    if status != EdgeStatus::Pending {
      error!(edge_id, %status, "settle on already settled edge");
      return Err(StoreError::NotPending {
        edge_id: edge_id.to_string(),
        status: Some(status),
      });
    }
    let edge = &mut table.edges[pos];
    edge.status = resolution.into();
    let settled = edge.clone();
    table.pending.remove(&PairKey::new(&settled.source, &settled.target));
    debug!(edge_id, status = %settled.status, "edge settled");
    Ok(settled)
  }

  /// Removes a `Rejected` edge.
  #[instrument(level = "trace", skip(self))]
  pub fn evict(&self, edge_id: &str) -> Result<Edge, StoreError> {
    let mut table = self.table();
    let pos = table.position(edge_id);
    match pos.map(|p| (p, table.edges[p].status)) {
      Some((p, EdgeStatus::Rejected)) => Ok(table.edges.remove(p)),
      other => Err(StoreError::NotRejected {
        edge_id: edge_id.to_string(),
        status: other.map(|(_, s)| s),
      }),
    }
  }

  /// Snapshot of all edges in insertion order.
  pub fn list_all(&self) -> Vec<Edge> {
    self.table().edges.clone()
  }

  pub fn get(&self, edge_id: &str) -> Option<Edge> {
    let table = self.table();
    table.position(edge_id).map(|p| table.edges[p].clone())
  }

  pub fn len(&self) -> usize {
    self.table().edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
