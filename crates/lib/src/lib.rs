//! kintsugi-lib: Core types and logic for Kintsugi
//!
//! This crate is the compiler front-end for Kintsugi build descriptions:
//! - `Derivation`: immutable, content-addressed description of a buildable unit
//! - `Finalizer`: hashes drafts into identified derivations and persists recipes
//! - `resolve_transitive`: flattens a dependency DAG into a valid build order
//! - `compose`: assembles layered composite derivations from a set of roots
//!
//! Fetching, building and running recipes is the job of the downstream
//! executor; nothing in this crate touches the network or spawns processes.

pub mod builders;
pub mod compose;
pub mod consts;
pub mod derivation;
pub mod finalize;
pub mod resolve;
pub mod store;
pub mod util;

pub use compose::{BuildOptions, ComposeError};
pub use derivation::{BuildRef, Derivation, Draft, DrvGraph, DrvId, OutId, Source};
pub use finalize::{FinalizeError, Finalized, Finalizer};
pub use resolve::{ResolveError, resolve_transitive};
pub use store::{RecipeStatus, StoreConfig};
