//! Canonical form for arbitrary nested data.
//!
//! Hashing a derivation is only meaningful if two structurally equal values
//! always encode to the same bytes. [`Value`] is an owned tagged union that
//! keeps object keys in insertion order; [`Value::into_canonical`] rewrites
//! every object, at every depth, so its keys are in lexicographic order.
//!
//! Arrays keep their element order. Dependency lists and layer stacks are
//! ordered, so reordering them must change the hash.
//!
//! Absent fields are never invented: a struct field skipped during
//! serialization stays absent, while an explicit `null` survives as
//! [`Value::Null`].

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A JSON-shaped value whose objects remember key insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Bool(bool),
  Number(serde_json::Number),
  String(String),
  Array(Vec<Value>),
  Object(Vec<(String, Value)>),
}

impl Value {
  /// Sort object keys recursively.
  ///
  /// Duplicate keys collapse to the last occurrence, mirroring how JSON
  /// parsers treat repeated keys.
  pub fn into_canonical(self) -> Value {
    match self {
      Value::Array(items) => Value::Array(items.into_iter().map(Value::into_canonical).collect()),
      Value::Object(entries) => {
        let sorted: BTreeMap<String, Value> = entries.into_iter().map(|(k, v)| (k, v.into_canonical())).collect();
        Value::Object(sorted.into_iter().collect())
      }
      scalar => scalar,
    }
  }
}

impl From<serde_json::Value> for Value {
  fn from(value: serde_json::Value) -> Self {
    match value {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Bool(b),
      serde_json::Value::Number(n) => Value::Number(n),
      serde_json::Value::String(s) => Value::String(s),
      serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
      serde_json::Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
    }
  }
}

impl From<Value> for serde_json::Value {
  fn from(value: Value) -> Self {
    match value {
      Value::Null => serde_json::Value::Null,
      Value::Bool(b) => serde_json::Value::Bool(b),
      Value::Number(n) => serde_json::Value::Number(n),
      Value::String(s) => serde_json::Value::String(s),
      Value::Array(items) => serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect()),
      Value::Object(entries) => {
        serde_json::Value::Object(entries.into_iter().map(|(k, v)| (k, serde_json::Value::from(v))).collect())
      }
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::String(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::String(s)
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Value::Number(n.into())
  }
}

impl Serialize for Value {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Value::Null => serializer.serialize_unit(),
      Value::Bool(b) => serializer.serialize_bool(*b),
      Value::Number(n) => n.serialize(serializer),
      Value::String(s) => serializer.serialize_str(s),
      Value::Array(items) => {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
          seq.serialize_element(item)?;
        }
        seq.end()
      }
      Value::Object(entries) => {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
          map.serialize_entry(k, v)?;
        }
        map.end()
      }
    }
  }
}

impl<'de> Deserialize<'de> for Value {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    serde_json::Value::deserialize(deserializer).map(Value::from)
  }
}

/// Serialize any value and return its canonical form.
pub fn to_canonical_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
  Ok(Value::from(serde_json::to_value(value)?).into_canonical())
}

/// Compact canonical JSON, the encoding that fingerprints are computed over.
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
  serde_json::to_string(&to_canonical_value(value)?)
}

/// Pretty-printed canonical JSON, the encoding recipes are stored in.
pub fn to_canonical_string_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
  serde_json::to_string_pretty(&to_canonical_value(value)?)
}
