use std::path::{Path, PathBuf};

use crate::consts::{RECIPE_EXT, RECIPES_DIR_ENV};
use crate::derivation::OutId;

/// Where finalized recipes are persisted.
///
/// With no directory configured, hashing still works and recipes are simply
/// not written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
  pub recipes_dir: Option<PathBuf>,
}

impl StoreConfig {
  pub fn new(recipes_dir: impl Into<PathBuf>) -> Self {
    Self {
      recipes_dir: Some(recipes_dir.into()),
    }
  }

  pub fn disabled() -> Self {
    Self { recipes_dir: None }
  }

  /// Read the store directory from `KINTSUGI_RECIPES_DIR`.
  ///
  /// An unset or empty variable disables persistence.
  pub fn from_env() -> Self {
    match std::env::var(RECIPES_DIR_ENV) {
      Ok(dir) if !dir.is_empty() => Self::new(dir),
      _ => Self::disabled(),
    }
  }

  pub fn is_enabled(&self) -> bool {
    self.recipes_dir.is_some()
  }

  /// `<store_dir>/<out>.json`, if a store directory is configured.
  pub fn recipe_path(&self, out: &OutId) -> Option<PathBuf> {
    self.recipes_dir.as_deref().map(|dir| recipe_path(dir, out))
  }
}

pub fn recipe_path(dir: &Path, out: &OutId) -> PathBuf {
  dir.join(format!("{}.{}", out, RECIPE_EXT))
}
