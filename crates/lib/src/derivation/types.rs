use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::util::hash::Fingerprint;

use super::source::Source;

/// Content-derived identifier of a derivation: `<fingerprint>-<name>-<version>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct OutId(String);

impl<'de> Deserialize<'de> for OutId {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    OutId::parse(&s).map_err(serde::de::Error::custom)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutIdError {
  #[error("malformed out identifier '{0}': expected <fingerprint>-<name>-<version>")]
  Malformed(String),
}

impl OutId {
  pub fn new(fingerprint: &Fingerprint, name: &str, version: &str) -> Self {
    OutId(format!("{}-{}-{}", fingerprint, name, version))
  }

  /// Parse and validate an identifier read from outside the finalizer.
  pub fn parse(s: &str) -> Result<Self, OutIdError> {
    match s.split_once('-') {
      Some((fp, rest)) if Fingerprint::is_valid(fp) && rest.contains('-') => Ok(OutId(s.to_string())),
      _ => Err(OutIdError::Malformed(s.to_string())),
    }
  }

  /// Wrap a string without validating it.
  ///
  /// Hand-built graphs use this; everything produced by the finalizer goes
  /// through [`OutId::new`] and everything read back through [`OutId::parse`].
  pub fn new_unchecked(s: impl Into<String>) -> Self {
    OutId(s.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// The leading fingerprint, if the identifier is well formed.
  pub fn fingerprint(&self) -> Option<&str> {
    self.0.split_once('-').map(|(fp, _)| fp).filter(|fp| Fingerprint::is_valid(fp))
  }

  /// The `name-version` part after the fingerprint.
  pub fn label(&self) -> &str {
    match self.fingerprint() {
      Some(fp) => &self.0[fp.len() + 1..],
      None => &self.0,
    }
  }
}

impl std::fmt::Display for OutId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for OutId {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

/// Index of a derivation inside the [`DrvGraph`](super::DrvGraph) that issued it.
///
/// Each id carries the tag of its graph, so a lookup in any other graph
/// finds nothing instead of whatever sits at the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrvId {
  graph: u64,
  index: usize,
}

impl DrvId {
  pub(crate) fn new(graph: u64, index: usize) -> Self {
    DrvId { graph, index }
  }

  pub(crate) fn graph(self) -> u64 {
    self.graph
  }

  pub fn index(self) -> usize {
    self.index
  }
}

impl std::fmt::Display for DrvId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.index)
  }
}

/// A derivation before it has been identified.
///
/// `deps` lists the derivations this one depends on, in order. Their
/// identifiers become `dependencies` on finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
  pub name: String,
  pub version: String,
  pub src: Source,
  pub deps: Vec<DrvId>,
  pub permissions: Option<BTreeSet<String>>,
  pub postbuild: Option<String>,
}

impl Draft {
  pub fn new(name: &str, version: &str, src: Source) -> Self {
    Self {
      name: name.to_string(),
      version: version.to_string(),
      src,
      deps: Vec::new(),
      permissions: None,
      postbuild: None,
    }
  }

  /// Set the dependencies. Ids must come from the graph this draft is
  /// finalized into; any other id is rejected as unknown.
  pub fn with_deps(mut self, deps: impl IntoIterator<Item = DrvId>) -> Self {
    self.deps = deps.into_iter().collect();
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

/// A finalized, identified derivation.
///
/// `dependencies` is the serialized form of the dependency list; `deps` holds
/// the same dependencies as arena ids for graph traversal and is never
/// serialized or hashed.
///
/// Fields are public so the executor side and tests can inspect them, but a
/// derivation with a real `out` only ever comes from the finalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
  pub name: String,
  pub version: String,
  pub out: OutId,
  pub src: Source,
  pub dependencies: Vec<OutId>,
  pub deps: Vec<DrvId>,
  pub permissions: Option<BTreeSet<String>>,
  pub postbuild: Option<String>,
}
