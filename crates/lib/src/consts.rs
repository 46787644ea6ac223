//! Crate-wide constants.

/// Number of hex characters of the SHA-256 digest kept in an [`OutId`](crate::OutId).
pub const OUT_HASH_LEN: usize = 32;

/// Version assigned to every composite produced by [`Finalizer::compose`](crate::Finalizer::compose).
pub const GENERATED_VERSION: &str = "generated";

/// Extension of recipe files in the store directory.
pub const RECIPE_EXT: &str = "json";

/// Environment variable read by [`StoreConfig::from_env`](crate::StoreConfig::from_env).
pub const RECIPES_DIR_ENV: &str = "KINTSUGI_RECIPES_DIR";

/// Directory, relative to the build root, that run specs are written into.
pub const RUN_SPEC_DIR: &str = "kintsugi/exec";
