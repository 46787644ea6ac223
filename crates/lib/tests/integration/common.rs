//! Shared test helpers.

use kintsugi_lib::builders::{mk_local, mk_url};
use kintsugi_lib::{DrvGraph, Finalized, Finalizer, StoreConfig};
use tempfile::TempDir;

/// Isolated store environment.
///
/// Each test gets its own temporary recipe directory.
pub struct TestStore {
  pub temp: TempDir,
  pub finalizer: Finalizer,
  pub graph: DrvGraph,
}

impl TestStore {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let finalizer = Finalizer::new(StoreConfig::new(temp.path().join("recipes")));
    Self {
      temp,
      finalizer,
      graph: DrvGraph::new(),
    }
  }

  pub fn recipes_dir(&self) -> std::path::PathBuf {
    self.temp.path().join("recipes")
  }

  pub fn local_game(&mut self) -> Finalized {
    mk_local(&self.finalizer, &mut self.graph, "local-game", "1.6.117", "/games/local").unwrap()
  }

  pub fn url_tool(&mut self) -> Finalized {
    mk_url(
      &self.finalizer,
      &mut self.graph,
      "url-tool",
      "2.0.0",
      "https://example.com/tool.zip",
      "sha256-hash",
    )
    .unwrap()
  }
}
