//! Core functionality shared by the orbital catalog crates.
//!
//! This crate provides configuration loading, logging setup and the
//! workspace-level error type.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, RowErrorPolicy, SyncPolicy};
pub use error::{CoreError, Result};
