//! Convenience constructors for common derivations.
//!
//! These shape input for the finalizer and add no semantics of their own.

use std::collections::BTreeMap;

use crate::consts::RUN_SPEC_DIR;
use crate::derivation::{Draft, DrvGraph, Source, Umu};
use crate::finalize::{FinalizeError, Finalized, Finalizer};
use crate::util::canonical::Value;

/// Finalize a `fetch_local` derivation for `path`.
pub fn mk_local(
  finalizer: &Finalizer,
  graph: &mut DrvGraph,
  name: &str,
  version: &str,
  path: &str,
) -> Result<Finalized, FinalizeError> {
  finalizer.finalize(graph, Draft::new(name, version, Source::fetch_local(path)))
}

/// Finalize a `fetch_url` derivation pinned to `sha256`.
pub fn mk_url(
  finalizer: &Finalizer,
  graph: &mut DrvGraph,
  name: &str,
  version: &str,
  url: &str,
  sha256: &str,
) -> Result<Finalized, FinalizeError> {
  finalizer.finalize(graph, Draft::new(name, version, Source::fetch_url(url, sha256)))
}

/// A named launch profile, e.g. `default` or `editor`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSpec {
  pub name: String,
  pub entrypoint: String,
  pub umu: Option<Umu>,
  pub args: Option<Vec<String>>,
  pub env: Option<BTreeMap<String, String>>,
}

impl RunSpec {
  pub fn path(&self) -> String {
    format!("{}/{}.run.json", RUN_SPEC_DIR, self.name)
  }

  fn content(&self) -> Value {
    let args = self.args.iter().flatten().map(|a| Value::from(a.as_str())).collect();
    let env = self
      .env
      .iter()
      .flatten()
      .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
      .collect();

    let mut entries = vec![("entrypoint".to_string(), Value::from(self.entrypoint.as_str()))];
    // Absent launcher settings leave no key behind.
    if let Some(umu) = &self.umu {
      entries.push((
        "umu".to_string(),
        Value::Object(vec![
          ("version".to_string(), Value::from(umu.version.as_str())),
          ("id".to_string(), Value::from(umu.id.as_str())),
        ]),
      ));
    }
    entries.push(("args".to_string(), Value::Array(args)));
    entries.push(("env".to_string(), Value::Object(env)));
    Value::Object(entries)
  }
}

/// Finalize a `write_json` derivation that drops a run spec at
/// `kintsugi/exec/<name>.run.json`. Meant to be used as a composite layer.
pub fn write_run_spec(finalizer: &Finalizer, graph: &mut DrvGraph, spec: &RunSpec) -> Result<Finalized, FinalizeError> {
  let draft = Draft::new(
    &format!("run-spec-{}", spec.name),
    "1.0.0",
    Source::write_json(&spec.path(), spec.content()),
  );
  finalizer.finalize(graph, draft)
}
