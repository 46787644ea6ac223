//! Transitive dependency resolution.
//!
//! [`resolve_transitive`] linearizes the dependency DAG reachable from a set
//! of roots:
//!
//! - every derivation appears after all of its dependencies
//! - each distinct `out` appears exactly once (first discovery wins)
//! - unrelated derivations keep depth-first visitation order of the roots and
//!   of each node's `deps`
//!
//! The traversal is a post-order DFS with three states per node. Reaching a
//! node that is still in progress means the graph has a cycle, and the whole
//! call fails without returning a partial order.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::derivation::{Derivation, DrvGraph, DrvId, OutId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  #[error("circular dependency detected involving {name} ({out})")]
  CycleDetected { name: String, out: OutId },

  #[error("unknown derivation {0}: not present in this graph")]
  UnknownDerivation(DrvId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
  InProgress,
  Done,
}

struct Resolver<'g> {
  graph: &'g DrvGraph,
  state: HashMap<&'g OutId, Visit>,
  order: Vec<DrvId>,
}

impl<'g> Resolver<'g> {
  fn new(graph: &'g DrvGraph) -> Self {
    Self {
      graph,
      state: HashMap::new(),
      order: Vec::new(),
    }
  }

  fn node(&self, id: DrvId) -> Result<&'g Derivation, ResolveError> {
    let graph: &'g DrvGraph = self.graph;
    graph.get(id).ok_or(ResolveError::UnknownDerivation(id))
  }

  /// Mark `id` in progress. Returns false if it is already done.
  fn enter(&mut self, id: DrvId) -> Result<bool, ResolveError> {
    let drv = self.node(id)?;
    match self.state.get(&drv.out) {
      Some(Visit::Done) => Ok(false),
      Some(Visit::InProgress) => Err(ResolveError::CycleDetected {
        name: drv.name.clone(),
        out: drv.out.clone(),
      }),
      None => {
        self.state.insert(&drv.out, Visit::InProgress);
        Ok(true)
      }
    }
  }

  fn visit(&mut self, root: DrvId) -> Result<(), ResolveError> {
    if !self.enter(root)? {
      return Ok(());
    }

    // (node, index of the next dep to visit)
    let mut stack: Vec<(DrvId, usize)> = vec![(root, 0)];

    while let Some(frame) = stack.last_mut() {
      let id = frame.0;
      let drv = self.node(id)?;

      if let Some(&dep) = drv.deps.get(frame.1) {
        frame.1 += 1;
        if self.enter(dep)? {
          stack.push((dep, 0));
        }
      } else {
        stack.pop();
        self.state.insert(&drv.out, Visit::Done);
        self.order.push(id);
      }
    }

    Ok(())
  }
}

/// Resolve the full, deduplicated, dependency-ordered closure of `roots`.
pub fn resolve_transitive(graph: &DrvGraph, roots: &[DrvId]) -> Result<Vec<DrvId>, ResolveError> {
  let mut resolver = Resolver::new(graph);
  for &root in roots {
    resolver.visit(root)?;
  }

  debug!(roots = roots.len(), resolved = resolver.order.len(), "resolved transitive layers");
  Ok(resolver.order)
}
