//! Configuration management for the orbital catalog.
//!
//! Settings are read from a TOML file (or built from defaults) and then
//! selectively overridden by environment variables, so container
//! deployments can tweak a single value without shipping a new file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Default remote launch feed query endpoint.
pub const DEFAULT_LAUNCH_FEED_URL: &str = "https://api.spacexdata.com/v4/launches/query";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub feed: FeedConfig,
    pub planets: PlanetsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file. Parent directories are created on open.
    pub database_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub sync_policy: SyncPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetsConfig {
    pub csv_path: PathBuf,
    #[serde(default)]
    pub row_error_policy: RowErrorPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

/// Whether a launch synchronization run may be skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Skip the run when the bootstrap sentinel launch is already stored
    #[default]
    SkipIfBootstrapped,
    /// Always fetch and upsert the whole remote set
    FullResync,
}

impl std::str::FromStr for SyncPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "skip_if_bootstrapped" => Ok(SyncPolicy::SkipIfBootstrapped),
            "full_resync" => Ok(SyncPolicy::FullResync),
            other => Err(CoreError::InvalidConfig {
                key: "sync_policy".to_string(),
                reason: format!("unknown policy '{}'", other),
            }),
        }
    }
}

/// What the planet loader does when a single row cannot be saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Log the failure, count it and keep consuming rows
    #[default]
    Continue,
    /// Stop the load at the first failed row
    Abort,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 8000,
            },
            store: StoreConfig {
                database_path: PathBuf::from("data/orbital.db"),
            },
            feed: FeedConfig {
                url: DEFAULT_LAUNCH_FEED_URL.to_string(),
                timeout_secs: 30,
                sync_policy: SyncPolicy::default(),
            },
            planets: PlanetsConfig {
                csv_path: PathBuf::from("data/kepler_data.csv"),
                row_error_policy: RowErrorPolicy::default(),
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    ///
    /// Recognized keys: `PORT`, `DATABASE_PATH`, `LAUNCH_FEED_URL`,
    /// `PLANETS_CSV`, `SYNC_POLICY`.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| CoreError::InvalidConfig {
                key: "PORT".to_string(),
                reason: format!("'{}' is not a port number", port),
            })?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.store.database_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("LAUNCH_FEED_URL") {
            self.feed.url = url;
        }
        if let Some(path) = lookup("PLANETS_CSV") {
            self.planets.csv_path = PathBuf::from(path);
        }
        if let Some(policy) = lookup("SYNC_POLICY") {
            self.feed.sync_policy = policy.parse()?;
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_host, self.server.port)
    }
}
