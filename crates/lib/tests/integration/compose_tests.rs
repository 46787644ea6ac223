//! End-to-end composition tests.

use kintsugi_lib::builders::{RunSpec, write_run_spec};
use kintsugi_lib::derivation::FetchBuild;
use kintsugi_lib::{BuildOptions, Derivation, Draft, DrvGraph, Finalizer, Source};

use super::common::TestStore;

fn fetch_build(drv: &Derivation) -> &FetchBuild {
  match &drv.src {
    Source::FetchBuild(build) => build,
    other => panic!("Expected FetchBuild source, got {}", other.kind()),
  }
}

#[test]
fn composes_independent_leaves_in_order() {
  let mut store = TestStore::new();
  let game = store.local_game();
  let tool = store.url_tool();

  let modpack = store
    .finalizer
    .compose(
      &mut store.graph,
      BuildOptions::new("test-modpack", [game.id, tool.id]).with_entrypoint("tool_loader.exe"),
    )
    .unwrap();

  assert!(modpack.out.as_str().ends_with("-test-modpack-generated"));
  let drv = store.graph.get(modpack.id).unwrap();
  assert_eq!(drv.src.kind(), "fetch_build");
  assert_eq!(fetch_build(drv).layers, vec![game.out, tool.out]);
  assert_eq!(fetch_build(drv).entrypoint.as_deref(), Some("tool_loader.exe"));
}

#[test]
fn identical_scripts_produce_identical_outs() {
  let build = || {
    let finalizer = Finalizer::default();
    let mut graph = DrvGraph::new();
    let game = finalizer
      .finalize(&mut graph, Draft::new("local-game", "1.6.117", Source::fetch_local("/games/local")))
      .unwrap();
    let patch = finalizer
      .finalize(
        &mut graph,
        Draft::new("patch", "0.3", Source::fetch_vase("patch")).with_deps([game.id]),
      )
      .unwrap();
    finalizer
      .compose(&mut graph, BuildOptions::new("pack", [patch.id]).with_args(["-fast"]))
      .unwrap()
      .out
  };

  assert_eq!(build(), build());
}

#[test]
fn run_spec_layer_is_part_of_the_stack() {
  let mut store = TestStore::new();
  let game = store.local_game();
  let spec = write_run_spec(
    &store.finalizer,
    &mut store.graph,
    &RunSpec {
      name: "default".to_string(),
      entrypoint: "game.exe".to_string(),
      ..Default::default()
    },
  )
  .unwrap();

  let pack = store
    .finalizer
    .compose(&mut store.graph, BuildOptions::new("pack", [game.id, spec.id]))
    .unwrap();
  let drv = store.graph.get(pack.id).unwrap();

  assert_eq!(fetch_build(drv).layers, vec![game.out, spec.out]);
}

#[test]
fn diamond_layers_resolve_once() {
  let mut store = TestStore::new();
  let base = store.local_game();
  let finalizer = store.finalizer.clone();
  let graph = &mut store.graph;

  let left = finalizer
    .finalize(graph, Draft::new("left", "1", Source::fetch_vase("left")).with_deps([base.id]))
    .unwrap();
  let right = finalizer
    .finalize(graph, Draft::new("right", "1", Source::fetch_vase("right")).with_deps([base.id]))
    .unwrap();
  let top = finalizer
    .finalize(graph, Draft::new("top", "1", Source::BlankSource).with_deps([left.id, right.id]))
    .unwrap();

  let pack = finalizer
    .compose(graph, BuildOptions::new("pack", [top.id, base.id]))
    .unwrap();
  let drv = graph.get(pack.id).unwrap();

  assert_eq!(
    fetch_build(drv).layers,
    vec![base.out, left.out, right.out, top.out]
  );
}
