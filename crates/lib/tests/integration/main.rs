//! Integration tests for kintsugi-lib.

mod common;
mod compose_tests;
mod store_tests;
