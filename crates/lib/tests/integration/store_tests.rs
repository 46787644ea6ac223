//! Recipe store tests: what the executor finds on disk.

use kintsugi_lib::derivation::{BuildRef, RunCommand};
use kintsugi_lib::store::{missing_recipes, read_recipe};
use kintsugi_lib::{BuildOptions, Draft, RecipeStatus, Source};

use super::common::TestStore;

#[test]
fn every_referenced_identifier_has_a_recipe() {
  let mut store = TestStore::new();
  let game = store.local_game();
  let tool = store.url_tool();

  let patched = store
    .finalizer
    .finalize(
      &mut store.graph,
      Draft::new(
        "patched-game",
        "1",
        Source::run_in_build(
          tool.id,
          RunCommand {
            entrypoint: "patcher.exe".to_string(),
            ..Default::default()
          },
          &["Data/patched.esp"],
        ),
      )
      .with_deps([game.id]),
    )
    .unwrap();

  let pack = store
    .finalizer
    .compose(&mut store.graph, BuildOptions::new("pack", [patched.id]))
    .unwrap();
  assert!(matches!(pack.recipe, RecipeStatus::Written(_)));

  assert!(missing_recipes(&store.recipes_dir(), &pack.out).unwrap().is_empty());
}

#[test]
fn recipe_omits_graph_links_and_reduces_builds() {
  let mut store = TestStore::new();
  let tool = store.url_tool();

  let run = store
    .finalizer
    .finalize(
      &mut store.graph,
      Draft::new("run", "1", Source::run_in_build(tool.id, RunCommand::default(), &["out"])),
    )
    .unwrap();

  let path = run.recipe.path().unwrap().to_path_buf();
  assert_eq!(path, store.recipes_dir().join(format!("{}.json", run.out)));

  let raw = std::fs::read_to_string(&path).unwrap();
  assert!(!raw.contains("\"deps\""));
  assert!(raw.contains(&format!("\"build\": \"{}\"", tool.out)));

  let recipe = read_recipe(&store.recipes_dir(), &run.out).unwrap();
  assert_eq!(recipe.out, run.out);
  let Source::RunInBuild(run_src) = recipe.src else {
    panic!("Expected RunInBuild source");
  };
  assert_eq!(run_src.build, BuildRef::Out(tool.out));
}

#[test]
fn rewriting_the_same_derivation_is_idempotent() {
  let mut store = TestStore::new();
  let first = store.local_game();
  let before = std::fs::read(first.recipe.path().unwrap()).unwrap();

  let second = store.local_game();
  assert!(matches!(second.recipe, RecipeStatus::AlreadyPresent(_)));
  assert_eq!(std::fs::read(second.recipe.path().unwrap()).unwrap(), before);
}

#[test]
fn missing_layer_recipe_is_detected() {
  let mut store = TestStore::new();
  let game = store.local_game();
  let pack = store
    .finalizer
    .compose(&mut store.graph, BuildOptions::new("pack", [game.id]))
    .unwrap();

  std::fs::remove_file(game.recipe.path().unwrap()).unwrap();

  assert_eq!(missing_recipes(&store.recipes_dir(), &pack.out).unwrap(), vec![game.out]);
}
