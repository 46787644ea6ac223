//! Hashing and finalization of drafts.
//!
//! Finalization is the only transition from a [`Draft`] to an identified
//! [`Derivation`]:
//!
//! 1. Dependencies are reduced to their identifiers; the arena links (`deps`)
//!    never enter the hash.
//! 2. A `run_in_build` source pointing at an arena node is reduced to that
//!    node's `out`.
//! 3. The remaining fields are canonicalized, encoded as compact JSON and
//!    hashed with SHA-256; the first 32 hex characters form the fingerprint.
//! 4. `out` is `<fingerprint>-<name>-<version>`.
//!
//! If a store directory is configured the recipe is then persisted. A failed
//! write is reported in [`Finalized::recipe`] and logged, but never fails the
//! finalization: chained derivations only need the identifier.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::derivation::{BuildRef, Derivation, Draft, DrvGraph, DrvId, OutId, Source};
use crate::store::{Recipe, RecipeStatus, StoreConfig, write_recipe};
use crate::util::hash::Hashable;

#[derive(Debug, Error)]
pub enum FinalizeError {
  #[error("derivation {field} must not be empty")]
  EmptyField { field: &'static str },

  #[error("unknown derivation {0}: not present in this graph")]
  UnknownDerivation(DrvId),

  #[error("failed to encode derivation {name}: {source}")]
  Encode { name: String, source: serde_json::Error },
}

/// Everything that determines a derivation's identity.
#[derive(Serialize)]
struct HashInput<'a> {
  name: &'a str,
  version: &'a str,
  src: &'a Source,
  dependencies: &'a [OutId],
  #[serde(skip_serializing_if = "Option::is_none")]
  permissions: Option<&'a BTreeSet<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  postbuild: Option<&'a str>,
}

impl Hashable for HashInput<'_> {}

/// Result of finalizing a draft.
#[derive(Debug)]
pub struct Finalized {
  pub id: DrvId,
  pub out: OutId,
  pub recipe: RecipeStatus,
}

/// Turns drafts into identified derivations and persists their recipes.
#[derive(Debug, Clone, Default)]
pub struct Finalizer {
  config: StoreConfig,
}

impl Finalizer {
  pub fn new(config: StoreConfig) -> Self {
    Self { config }
  }

  pub fn recipe_path(&self, out: &OutId) -> Option<PathBuf> {
    self.config.recipe_path(out)
  }

  /// Identify `draft`, persist its recipe and add it to `graph`.
  pub fn finalize(&self, graph: &mut DrvGraph, draft: Draft) -> Result<Finalized, FinalizeError> {
    let drv = identify(graph, draft)?;
    let recipe = self.persist(&drv);
    let out = drv.out.clone();
    let id = graph.insert(drv);

    Ok(Finalized { id, out, recipe })
  }

  fn persist(&self, drv: &Derivation) -> RecipeStatus {
    let Some(dir) = self.config.recipes_dir.as_deref() else {
      return RecipeStatus::Disabled;
    };

    match write_recipe(dir, &Recipe::from(drv)) {
      Ok(status) => status,
      Err(e) => {
        warn!(out = %drv.out, error = %e, "failed to write recipe");
        RecipeStatus::Failed(e)
      }
    }
  }
}

/// Compute the identified derivation for `draft` without storing it.
///
/// `graph` is only read, to look up the identifiers of `deps` and of a
/// `run_in_build` target.
pub fn identify(graph: &DrvGraph, draft: Draft) -> Result<Derivation, FinalizeError> {
  if draft.name.is_empty() {
    return Err(FinalizeError::EmptyField { field: "name" });
  }
  if draft.version.is_empty() {
    return Err(FinalizeError::EmptyField { field: "version" });
  }

  let dependencies = draft
    .deps
    .iter()
    .map(|&id| out_of(graph, id))
    .collect::<Result<Vec<_>, _>>()?;
  let src = reduce_source(graph, draft.src)?;

  let input = HashInput {
    name: &draft.name,
    version: &draft.version,
    src: &src,
    dependencies: &dependencies,
    permissions: draft.permissions.as_ref(),
    postbuild: draft.postbuild.as_deref(),
  };
  let fingerprint = input.fingerprint().map_err(|source| FinalizeError::Encode {
    name: draft.name.clone(),
    source,
  })?;
  let out = OutId::new(&fingerprint, &draft.name, &draft.version);

  debug!(out = %out, src = src.kind(), dependencies = dependencies.len(), "identified derivation");

  Ok(Derivation {
    name: draft.name,
    version: draft.version,
    out,
    src,
    dependencies,
    deps: draft.deps,
    permissions: draft.permissions,
    postbuild: draft.postbuild,
  })
}

fn out_of(graph: &DrvGraph, id: DrvId) -> Result<OutId, FinalizeError> {
  graph
    .get(id)
    .map(|drv| drv.out.clone())
    .ok_or(FinalizeError::UnknownDerivation(id))
}

fn reduce_source(graph: &DrvGraph, src: Source) -> Result<Source, FinalizeError> {
  match src {
    Source::RunInBuild(mut run) => {
      if let BuildRef::Node(id) = run.build {
        run.build = BuildRef::Out(out_of(graph, id)?);
      }
      Ok(Source::RunInBuild(run))
    }
    other => Ok(other),
  }
}
