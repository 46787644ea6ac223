//! Layered composite derivations.
//!
//! A composite is an ordered stack of layers applied one after another
//! (overlay semantics). Every transitive dependency of the requested layers
//! becomes an explicit layer, in dependency order, so the executor never has
//! to guess at missing pieces of the runtime environment.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::info;

use crate::consts::GENERATED_VERSION;
use crate::derivation::{Draft, DrvGraph, DrvId, FetchBuild, OutId, Source};
use crate::finalize::{FinalizeError, Finalized, Finalizer};
use crate::resolve::{ResolveError, resolve_transitive};

/// Inputs of a composite build.
///
/// Launch fields (`entrypoint`, `umu`, `args`, `env`) are passed through as
/// is; whether they make sense is the executor's call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOptions {
  pub name: String,
  /// Root layers. Their dependencies are added automatically.
  pub layers: Vec<DrvId>,
  pub entrypoint: Option<String>,
  pub umu: Option<String>,
  pub args: Option<Vec<String>>,
  pub env: Option<BTreeMap<String, String>>,
  pub permissions: Option<BTreeSet<String>>,
  pub postbuild: Option<String>,
}

impl BuildOptions {
  pub fn new(name: &str, layers: impl IntoIterator<Item = DrvId>) -> Self {
    Self {
      name: name.to_string(),
      layers: layers.into_iter().collect(),
      ..Default::default()
    }
  }

  pub fn with_entrypoint(mut self, entrypoint: &str) -> Self {
    self.entrypoint = Some(entrypoint.to_string());
    self
  }

  pub fn with_umu(mut self, umu: &str) -> Self {
    self.umu = Some(umu.to_string());
    self
  }

  pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
    self.args = Some(args.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
    self.env = Some(env);
    self
  }

  pub fn with_permissions<S: Into<String>>(mut self, permissions: impl IntoIterator<Item = S>) -> Self {
    self.permissions = Some(permissions.into_iter().map(Into::into).collect());
    self
  }

  pub fn with_postbuild(mut self, cmd: &str) -> Self {
    self.postbuild = Some(cmd.to_string());
    self
  }
}

#[derive(Debug, Error)]
pub enum ComposeError {
  #[error("failed to resolve layers: {0}")]
  Resolve(#[from] ResolveError),

  #[error(transparent)]
  Finalize(#[from] FinalizeError),
}

impl Finalizer {
  /// Build a composite `fetch_build` derivation from `options`.
  ///
  /// The layer list is the transitive closure of `options.layers` in
  /// dependency order. It is used both as the source's `layers` and as the
  /// composite's dependencies, so composites can themselves be layered.
  pub fn compose(&self, graph: &mut DrvGraph, options: BuildOptions) -> Result<Finalized, ComposeError> {
    let resolved = resolve_transitive(graph, &options.layers)?;
    let layers: Vec<OutId> = resolved
      .iter()
      .filter_map(|&id| graph.get(id))
      .map(|drv| drv.out.clone())
      .collect();
    let layer_count = layers.len();

    let src = Source::FetchBuild(FetchBuild {
      layers,
      entrypoint: options.entrypoint,
      umu: options.umu,
      args: options.args,
      env: options.env,
      permissions: options.permissions.clone(),
    });

    let draft = Draft {
      name: options.name,
      version: GENERATED_VERSION.to_string(),
      src,
      deps: resolved,
      permissions: options.permissions,
      postbuild: options.postbuild,
    };

    let finalized = self.finalize(graph, draft)?;
    info!(out = %finalized.out, layers = layer_count, "composed build");
    Ok(finalized)
  }
}
