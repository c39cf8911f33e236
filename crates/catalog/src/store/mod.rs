//! Document store adapter
//!
//! The catalog talks to storage through two keyed collections:
//! - `launches`, keyed by flight number and read back in ascending order
//! - `planets`, keyed by Kepler name and read back in insertion order
//!
//! Every write is an upsert on the collection key, except status updates,
//! which never insert. Implementations guarantee single-document atomicity
//! only; nothing here spans multiple documents.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Launch, Planet};

/// Errors raised by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt document {key}: {reason}")]
    CorruptDocument { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Skip/limit window over a sorted collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Documents to skip from the start
    pub skip: u64,
    /// Maximum documents to return; 0 means no limit
    pub limit: u64,
}

impl Page {
    /// Every document
    pub fn all() -> Self {
        Self::default()
    }

    /// Apply the window to an already-sorted iterator
    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let skipped = items.skip(skip);
        if self.limit == 0 {
            skipped.collect()
        } else {
            skipped
                .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
                .collect()
        }
    }
}

/// Outcome of an update-without-insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents that matched the key
    pub matched: u64,
    /// Documents whose stored values actually changed
    pub modified: u64,
}

/// The `launches` collection
#[async_trait]
pub trait LaunchStore: Send + Sync {
    /// Find one launch by flight number
    async fn find_launch(&self, flight_number: i64) -> Result<Option<Launch>>;

    /// Find launches sorted by flight number ascending, windowed by `page`
    async fn find_launches(&self, page: Page) -> Result<Vec<Launch>>;

    /// Highest stored flight number, if any
    async fn latest_flight_number(&self) -> Result<Option<i64>>;

    /// Insert the launch, or overwrite the one with the same flight number.
    ///
    /// A `None` target on the incoming document leaves a stored target
    /// untouched.
    async fn upsert_launch(&self, launch: &Launch) -> Result<()>;

    /// Set `upcoming` and `success` on an existing launch. Never inserts.
    async fn update_launch_status(
        &self,
        flight_number: i64,
        upcoming: bool,
        success: Option<bool>,
    ) -> Result<UpdateResult>;

    async fn count_launches(&self) -> Result<u64>;
}

/// The `planets` collection
#[async_trait]
pub trait PlanetStore: Send + Sync {
    /// Find one planet by Kepler name
    async fn find_planet(&self, kepler_name: &str) -> Result<Option<Planet>>;

    /// All planets in storage order
    async fn find_planets(&self) -> Result<Vec<Planet>>;

    /// Insert the planet unless one with the same name exists
    async fn upsert_planet(&self, planet: &Planet) -> Result<()>;

    async fn count_planets(&self) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_apply() {
        let items = 1..=25;
        assert_eq!(Page::all().apply(items.clone()).len(), 25);

        let second = Page { skip: 10, limit: 10 }.apply(items.clone());
        assert_eq!(second, (11..=20).collect::<Vec<_>>());

        let tail = Page { skip: 20, limit: 0 }.apply(items.clone());
        assert_eq!(tail, vec![21, 22, 23, 24, 25]);

        let past_end = Page { skip: 30, limit: 5 }.apply(items);
        assert!(past_end.is_empty());
    }
}
