//! Derivation data model.
//!
//! A derivation is an immutable, content-addressed description of something
//! the executor can fetch or build. Callers assemble a [`Draft`]; the
//! [`Finalizer`](crate::Finalizer) is the only thing that turns a draft into
//! an identified [`Derivation`] with an [`OutId`].
//!
//! Derivations live in a [`DrvGraph`] arena and refer to their dependencies by
//! [`DrvId`], so shared (diamond) sub-graphs are stored once.
//!
//! # Submodules
//!
//! - [`graph`] - The arena holding finalized derivations
//! - [`source`] - How a derivation's content is obtained

pub mod graph;
pub mod source;
mod types;

pub use graph::DrvGraph;
pub use source::*;
pub use types::*;
