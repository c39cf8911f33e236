//! Integration tests for the orbital catalog
//!
//! This test suite validates:
//! - Startup population from the launch feed and the planet table
//! - Idempotence of repeated synchronization and loading
//! - Scheduling, aborting and paginated reads over a durable store

pub mod test_utils;

#[cfg(test)]
mod catalog_lifecycle_tests;
