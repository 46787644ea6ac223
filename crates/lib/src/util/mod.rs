//! Shared utilities.
//!
//! Canonical encoding and content hashing used by the finalizer and the
//! recipe store.

pub mod canonical;
pub mod hash;
