//! Arena of derivations.
//!
//! Derivations reference their dependencies by [`DrvId`] instead of owning
//! them, so a dependency shared by many dependents is stored exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{Derivation, DrvId, OutId};

static NEXT_GRAPH_TAG: AtomicU64 = AtomicU64::new(1);

/// Content-addressed arena of derivations.
///
/// Inserting a derivation whose `out` is already present returns the id of
/// the existing entry; the arena never holds two entries with the same `out`.
/// Ids are only valid in the graph that issued them.
#[derive(Debug)]
pub struct DrvGraph {
  tag: u64,
  nodes: Vec<Derivation>,
  by_out: HashMap<OutId, DrvId>,
}

impl Default for DrvGraph {
  fn default() -> Self {
    Self {
      tag: NEXT_GRAPH_TAG.fetch_add(1, Ordering::Relaxed),
      nodes: Vec::new(),
      by_out: HashMap::new(),
    }
  }
}

impl DrvGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a derivation and return its id.
  pub fn insert(&mut self, drv: Derivation) -> DrvId {
    if let Some(&id) = self.by_out.get(&drv.out) {
      return id;
    }

    let id = DrvId::new(self.tag, self.nodes.len());
    self.by_out.insert(drv.out.clone(), id);
    self.nodes.push(drv);
    id
  }

  /// Look up a derivation. Ids issued by another graph are never found.
  pub fn get(&self, id: DrvId) -> Option<&Derivation> {
    if id.graph() != self.tag {
      return None;
    }
    self.nodes.get(id.index())
  }

  /// Find the id of a derivation by its identifier.
  pub fn id_of(&self, out: &OutId) -> Option<DrvId> {
    self.by_out.get(out).copied()
  }

  pub fn by_out(&self, out: &OutId) -> Option<&Derivation> {
    self.id_of(out).and_then(|id| self.get(id))
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Id for the slot at `index`, whether or not it is occupied yet. Lets
  /// tests wire forward references and cycles by hand.
  #[cfg(test)]
  pub(crate) fn id_at(&self, index: usize) -> DrvId {
    DrvId::new(self.tag, index)
  }
}
