//! Recipe store for kintsugi.
//!
//! The store directory holds one recipe per finalized derivation, named by
//! its identifier. It is append-only and content-addressed: a file is never
//! rewritten with different content, so concurrent writers of the same
//! identifier cannot conflict.
//!
//! # Layout
//!
//! ```text
//! <store_dir>/
//! ├── <fingerprint>-<name>-<version>.json
//! └── ...
//! ```

mod config;
mod recipe;

pub use config::StoreConfig;
pub use recipe::*;
