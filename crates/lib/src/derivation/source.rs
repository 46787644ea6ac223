//! Source variants.
//!
//! A [`Source`] describes how a derivation's content is obtained. The set of
//! variants is closed; the core checks structural shape only and never looks
//! at what a URL or path points to.
//!
//! On the wire every variant is a JSON object tagged by `type`:
//!
//! ```json
//! { "type": "fetch_url", "url": "https://example.com/tool.zip", "sha256": "..." }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::util::canonical::Value;

use super::types::{DrvId, OutId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
  FetchUrl(FetchUrl),
  FetchGit(FetchGit),
  FetchLocal(FetchLocal),
  FetchVase(FetchVase),
  WriteText(WriteText),
  WriteJson(WriteContent),
  WriteToml(WriteContent),
  FetchBuild(FetchBuild),
  RunInBuild(RunInBuild),
  /// Placeholder for content inserted later. Ignored by the executor.
  BlankSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
  Get,
  Post,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchUrl {
  pub url: String,
  pub sha256: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unpack: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<HttpMethod>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub headers: Option<BTreeMap<String, String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cookies: Option<BTreeMap<String, String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
  #[serde(rename = "postFetch", skip_serializing_if = "Option::is_none")]
  pub post_fetch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchGit {
  pub url: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rev: Option<String>,
  #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
  pub git_ref: Option<String>,
  #[serde(rename = "postFetch", skip_serializing_if = "Option::is_none")]
  pub post_fetch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchLocal {
  pub path: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exclude: Option<Vec<String>>,
  #[serde(rename = "postFetch", skip_serializing_if = "Option::is_none")]
  pub post_fetch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchVase {
  pub vase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteText {
  pub path: String,
  pub content: String,
}

/// Structured content for `write_json` and `write_toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteContent {
  pub path: String,
  pub content: Value,
}

/// An ordered stack of layers plus how to launch the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchBuild {
  pub layers: Vec<OutId>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub entrypoint: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub umu: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub args: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub env: Option<BTreeMap<String, String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub permissions: Option<BTreeSet<String>>,
}

/// Run a command inside a previously built derivation and capture `outputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInBuild {
  pub build: BuildRef,
  pub command: RunCommand,
  pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunCommand {
  pub entrypoint: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub args: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub umu: Option<Umu>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Umu {
  pub version: String,
  pub id: String,
}

/// The derivation a `run_in_build` source runs inside.
///
/// Drafts may point at a node in the arena; finalization reduces that to the
/// node's identifier. Only the identifier ever reaches a hash or a recipe, so
/// serializing an unreduced `Node` is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildRef {
  Node(DrvId),
  Out(OutId),
}

impl BuildRef {
  pub fn out(&self) -> Option<&OutId> {
    match self {
      BuildRef::Out(out) => Some(out),
      BuildRef::Node(_) => None,
    }
  }
}

impl From<DrvId> for BuildRef {
  fn from(id: DrvId) -> Self {
    BuildRef::Node(id)
  }
}

impl From<OutId> for BuildRef {
  fn from(out: OutId) -> Self {
    BuildRef::Out(out)
  }
}

impl Serialize for BuildRef {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      BuildRef::Out(out) => out.serialize(serializer),
      BuildRef::Node(id) => Err(serde::ser::Error::custom(format!(
        "build reference {} was not reduced to an out identifier",
        id
      ))),
    }
  }
}

impl<'de> Deserialize<'de> for BuildRef {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    OutId::deserialize(deserializer).map(BuildRef::Out)
  }
}

impl Source {
  pub fn fetch_url(url: &str, sha256: &str) -> Self {
    Source::FetchUrl(FetchUrl {
      url: url.to_string(),
      sha256: sha256.to_string(),
      ..Default::default()
    })
  }

  pub fn fetch_git(url: &str, rev: Option<&str>) -> Self {
    Source::FetchGit(FetchGit {
      url: url.to_string(),
      rev: rev.map(str::to_string),
      ..Default::default()
    })
  }

  pub fn fetch_local(path: &str) -> Self {
    Source::FetchLocal(FetchLocal {
      path: path.to_string(),
      ..Default::default()
    })
  }

  pub fn fetch_vase(vase: &str) -> Self {
    Source::FetchVase(FetchVase { vase: vase.to_string() })
  }

  pub fn write_text(path: &str, content: &str) -> Self {
    Source::WriteText(WriteText {
      path: path.to_string(),
      content: content.to_string(),
    })
  }

  pub fn write_json(path: &str, content: impl Into<Value>) -> Self {
    Source::WriteJson(WriteContent {
      path: path.to_string(),
      content: content.into(),
    })
  }

  pub fn write_toml(path: &str, content: impl Into<Value>) -> Self {
    Source::WriteToml(WriteContent {
      path: path.to_string(),
      content: content.into(),
    })
  }

  pub fn run_in_build(build: impl Into<BuildRef>, command: RunCommand, outputs: &[&str]) -> Self {
    Source::RunInBuild(RunInBuild {
      build: build.into(),
      command,
      outputs: outputs.iter().map(|s| s.to_string()).collect(),
    })
  }

  /// The `type` tag this source serializes with.
  pub fn kind(&self) -> &'static str {
    match self {
      Source::FetchUrl(_) => "fetch_url",
      Source::FetchGit(_) => "fetch_git",
      Source::FetchLocal(_) => "fetch_local",
      Source::FetchVase(_) => "fetch_vase",
      Source::WriteText(_) => "write_text",
      Source::WriteJson(_) => "write_json",
      Source::WriteToml(_) => "write_toml",
      Source::FetchBuild(_) => "fetch_build",
      Source::RunInBuild(_) => "run_in_build",
      Source::BlankSource => "blank_source",
    }
  }

  pub fn is_blank(&self) -> bool {
    matches!(self, Source::BlankSource)
  }

  /// Identifiers of other derivations this source refers to.
  ///
  /// Covers `fetch_build` layers and a reduced `run_in_build` target.
  pub fn referenced_outs(&self) -> Vec<&OutId> {
    match self {
      Source::FetchBuild(build) => build.layers.iter().collect(),
      Source::RunInBuild(run) => run.build.out().into_iter().collect(),
      _ => Vec::new(),
    }
  }
}
