//! On-disk recipe form of a derivation.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::derivation::{Derivation, OutId, Source};
use crate::util::canonical::to_canonical_string_pretty;

pub use super::config::recipe_path;

/// A finalized derivation as the executor sees it.
///
/// Dependencies appear only as identifiers; the in-memory graph is not
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
  pub out: OutId,
  pub name: String,
  pub version: String,
  pub src: Source,
  #[serde(default)]
  pub dependencies: Vec<OutId>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub permissions: Option<BTreeSet<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub postbuild: Option<String>,
}

impl From<&Derivation> for Recipe {
  fn from(drv: &Derivation) -> Self {
    Self {
      out: drv.out.clone(),
      name: drv.name.clone(),
      version: drv.version.clone(),
      src: drv.src.clone(),
      dependencies: drv.dependencies.clone(),
      permissions: drv.permissions.clone(),
      postbuild: drv.postbuild.clone(),
    }
  }
}

impl Recipe {
  /// Every identifier this recipe requires the executor to resolve.
  pub fn references(&self) -> impl Iterator<Item = &OutId> {
    self.dependencies.iter().chain(self.src.referenced_outs())
  }
}

#[derive(Debug, Error)]
pub enum RecipeError {
  #[error("failed to serialize recipe {out}: {source}")]
  Serialize { out: OutId, source: serde_json::Error },

  #[error("io error at {path}: {source}")]
  Io { path: PathBuf, source: std::io::Error },

  #[error("failed to parse recipe {path}: {source}")]
  Parse { path: PathBuf, source: serde_json::Error },
}

/// What happened to the recipe of a freshly finalized derivation.
#[derive(Debug)]
pub enum RecipeStatus {
  /// No store directory is configured.
  Disabled,
  Written(PathBuf),
  /// A recipe with this identifier was already in the store.
  AlreadyPresent(PathBuf),
  /// Persisting failed. The derivation itself is still valid.
  Failed(RecipeError),
}

impl RecipeStatus {
  pub fn path(&self) -> Option<&Path> {
    match self {
      RecipeStatus::Written(path) | RecipeStatus::AlreadyPresent(path) => Some(path),
      RecipeStatus::Disabled | RecipeStatus::Failed(_) => None,
    }
  }

  pub fn is_failed(&self) -> bool {
    matches!(self, RecipeStatus::Failed(_))
  }
}

/// Persist a recipe as `<dir>/<out>.json`.
///
/// Content is pretty-printed canonical JSON written to a temporary file in
/// `dir` and renamed into place. An existing file is left as is.
pub fn write_recipe(dir: &Path, recipe: &Recipe) -> Result<RecipeStatus, RecipeError> {
  let path = recipe_path(dir, &recipe.out);
  if path.exists() {
    debug!(out = %recipe.out, "recipe already present");
    return Ok(RecipeStatus::AlreadyPresent(path));
  }

  let content = to_canonical_string_pretty(recipe).map_err(|source| RecipeError::Serialize {
    out: recipe.out.clone(),
    source,
  })?;

  fs::create_dir_all(dir).map_err(io_error(dir))?;
  let mut tmp = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
  tmp.write_all(content.as_bytes()).map_err(io_error(tmp.path()))?;
  tmp.persist(&path).map_err(|e| RecipeError::Io {
    path: path.clone(),
    source: e.error,
  })?;

  info!(out = %recipe.out, path = ?path, "wrote recipe");
  Ok(RecipeStatus::Written(path))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> RecipeError {
  let path = path.to_path_buf();
  move |source| RecipeError::Io { path, source }
}

pub fn read_recipe(dir: &Path, out: &OutId) -> Result<Recipe, RecipeError> {
  let path = recipe_path(dir, out);
  let content = fs::read_to_string(&path).map_err(|source| RecipeError::Io {
    path: path.clone(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| RecipeError::Parse { path, source })
}

/// Walk every identifier reachable from `root` and return those without a
/// recipe file, in discovery order.
///
/// A complete store returns an empty list: the executor can resolve the whole
/// closure of `root` from disk.
pub fn missing_recipes(dir: &Path, root: &OutId) -> Result<Vec<OutId>, RecipeError> {
  let mut missing = Vec::new();
  let mut seen: HashSet<OutId> = HashSet::new();
  let mut stack = vec![root.clone()];

  while let Some(out) = stack.pop() {
    if !seen.insert(out.clone()) {
      continue;
    }

    if !recipe_path(dir, &out).exists() {
      missing.push(out);
      continue;
    }

    let recipe = read_recipe(dir, &out)?;
    // reversed so the first reference is visited first
    let refs: Vec<OutId> = recipe.references().cloned().collect();
    stack.extend(refs.into_iter().rev());
  }

  Ok(missing)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::derivation::FetchBuild;
  use crate::util::hash::Fingerprint;
  use tempfile::tempdir;

  const FP: &str = "0123456789abcdef0123456789abcdef";

  fn id(name: &str) -> OutId {
    OutId::new(&Fingerprint(FP.to_string()), name, "1.0.0")
  }

  fn recipe(name: &str, deps: &[&str]) -> Recipe {
    Recipe {
      out: id(name),
      name: name.to_string(),
      version: "1.0.0".to_string(),
      src: Source::write_text("test.txt", "hello"),
      dependencies: deps.iter().map(|d| id(d)).collect(),
      permissions: None,
      postbuild: None,
    }
  }

  #[test]
  fn write_then_read() {
    let temp = tempdir().unwrap();
    let r = recipe("pkg", &["dep"]);

    let status = write_recipe(temp.path(), &r).unwrap();
    assert!(matches!(status, RecipeStatus::Written(_)));
    let expected = temp.path().join(format!("{FP}-pkg-1.0.0.json"));
    assert_eq!(status.path(), Some(expected.as_path()));

    assert_eq!(read_recipe(temp.path(), &r.out).unwrap(), r);
  }

  #[test]
  fn written_recipe_is_pretty_and_sorted() {
    let temp = tempdir().unwrap();
    let r = recipe("pkg", &[]);
    write_recipe(temp.path(), &r).unwrap();

    let content = fs::read_to_string(recipe_path(temp.path(), &r.out)).unwrap();
    assert!(content.contains('\n'));
    let keys: Vec<usize> = ["\"dependencies\"", "\"name\"", "\"out\"", "\"src\"", "\"version\""]
      .iter()
      .map(|k| content.find(k).unwrap())
      .collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys out of order:\n{}", content);
    assert!(!content.contains("\"deps\""));
    assert!(!content.contains("\"permissions\""));
  }

  #[test]
  fn existing_recipe_is_not_rewritten() {
    let temp = tempdir().unwrap();
    let r = recipe("pkg", &[]);
    let path = recipe_path(temp.path(), &r.out);
    fs::write(&path, "sentinel").unwrap();

    let status = write_recipe(temp.path(), &r).unwrap();
    assert!(matches!(status, RecipeStatus::AlreadyPresent(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "sentinel");
  }

  #[test]
  fn creates_missing_store_directory() {
    let temp = tempdir().unwrap();
    let dir = temp.path().join("nested").join("recipes");
    write_recipe(&dir, &recipe("pkg", &[])).unwrap();
    assert!(dir.join(format!("{FP}-pkg-1.0.0.json")).exists());
  }

  #[test]
  fn read_reports_parse_errors() {
    let temp = tempdir().unwrap();
    let out = id("pkg");
    fs::write(recipe_path(temp.path(), &out), "{ not json").unwrap();

    let err = read_recipe(temp.path(), &out).unwrap_err();
    assert!(matches!(err, RecipeError::Parse { .. }));
  }

  #[test]
  fn read_rejects_malformed_identifiers() {
    let temp = tempdir().unwrap();
    let out = id("pkg");
    let content = serde_json::json!({
      "out": out.as_str(),
      "name": "pkg",
      "version": "1.0.0",
      "src": { "type": "blank_source" },
      "dependencies": ["not-an-identifier"],
    });
    fs::write(recipe_path(temp.path(), &out), content.to_string()).unwrap();

    let err = read_recipe(temp.path(), &out).unwrap_err();
    assert!(matches!(err, RecipeError::Parse { .. }));
    assert!(err.to_string().contains("malformed out identifier 'not-an-identifier'"));
  }

  #[test]
  fn missing_recipes_walks_dependencies_and_layers() {
    let temp = tempdir().unwrap();
    write_recipe(temp.path(), &recipe("base", &[])).unwrap();
    write_recipe(temp.path(), &recipe("mid", &["base", "gone-dep"])).unwrap();

    let mut top = recipe("top", &["mid"]);
    top.src = Source::FetchBuild(FetchBuild {
      layers: vec![id("mid"), id("gone-layer")],
      ..Default::default()
    });
    write_recipe(temp.path(), &top).unwrap();

    let missing = missing_recipes(temp.path(), &top.out).unwrap();
    assert_eq!(missing, vec![id("gone-dep"), id("gone-layer")]);
  }

  #[test]
  fn missing_root_is_reported() {
    let temp = tempdir().unwrap();
    let root = id("nothing-here");
    assert_eq!(missing_recipes(temp.path(), &root).unwrap(), vec![root]);
  }
}
