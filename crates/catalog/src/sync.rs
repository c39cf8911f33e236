//! Launch synchronization
//!
//! One-way reconciliation of the remote launch feed into the `launches`
//! collection. Every record is normalized before anything is written, so a
//! failed status or a malformed record leaves the store untouched for that
//! run. Writes are upserts keyed by flight number, which makes a repeated
//! run converge on the same documents.

use orbital_core::SyncPolicy;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::feed::{FeedError, LaunchFeed, RemoteLaunch};
use crate::model::Launch;
use crate::store::{LaunchStore, StoreError};

/// Flight number whose presence marks the catalog as bootstrapped
pub const BOOTSTRAP_SENTINEL_FLIGHT: i64 = 1;

/// Synchronization failures
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Launch data download failed: {0}")]
    Feed(#[from] FeedError),

    #[error("Launch data download failed with status {status}")]
    FailedStatus { status: u16 },

    #[error("Malformed launch record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// What a synchronization run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The sentinel launch was present and the policy allowed skipping
    Skipped,
    /// The remote set was fetched and upserted
    Synchronized { upserted: usize },
}

pub struct LaunchSynchronizer {
    feed: Arc<dyn LaunchFeed>,
    launches: Arc<dyn LaunchStore>,
    policy: SyncPolicy,
}

impl LaunchSynchronizer {
    pub fn new(feed: Arc<dyn LaunchFeed>, launches: Arc<dyn LaunchStore>) -> Self {
        Self {
            feed,
            launches,
            policy: SyncPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one synchronization according to the configured policy
    pub async fn synchronize(&self) -> Result<SyncOutcome, SyncError> {
        if self.policy == SyncPolicy::SkipIfBootstrapped
            && self
                .launches
                .find_launch(BOOTSTRAP_SENTINEL_FLIGHT)
                .await?
                .is_some()
        {
            info!("Launch data already loaded");
            return Ok(SyncOutcome::Skipped);
        }

        info!("Downloading launch data");
        let response = self.feed.fetch_launches().await?;

        if !response.is_success() {
            warn!(status = response.status, "Problem downloading launch data");
            return Err(SyncError::FailedStatus {
                status: response.status,
            });
        }

        let launches = response
            .docs
            .into_iter()
            .enumerate()
            .map(|(index, doc)| {
                RemoteLaunch::from_value(doc)
                    .and_then(RemoteLaunch::into_launch)
                    .map_err(|reason| SyncError::MalformedRecord { index, reason })
            })
            .collect::<Result<Vec<Launch>, _>>()?;

        for launch in &launches {
            debug!(
                flight_number = launch.flight_number,
                mission = %launch.mission,
                customers = ?launch.customers,
                "Saving launch"
            );
            self.launches.upsert_launch(launch).await?;
        }

        info!(upserted = launches.len(), "Launch data synchronized");

        Ok(SyncOutcome::Synchronized {
            upserted: launches.len(),
        })
    }
}
