//! Launch lifecycle transitions

use std::sync::Arc;
use tracing::{debug, info};

use crate::store::{LaunchStore, Result};

pub struct LaunchLifecycle {
    launches: Arc<dyn LaunchStore>,
}

impl LaunchLifecycle {
    pub fn new(launches: Arc<dyn LaunchStore>) -> Self {
        Self { launches }
    }

    pub async fn launch_exists(&self, flight_number: i64) -> Result<bool> {
        Ok(self.launches.find_launch(flight_number).await?.is_some())
    }

    /// Mark a launch as aborted (`upcoming = false`, `success = false`).
    ///
    /// Returns `true` only if exactly one launch matched and changed. An
    /// unknown flight number, or a launch already aborted, yields `false`.
    /// No document is ever created.
    pub async fn abort_launch(&self, flight_number: i64) -> Result<bool> {
        let result = self
            .launches
            .update_launch_status(flight_number, false, Some(false))
            .await?;

        let aborted = result.matched == 1 && result.modified == 1;
        if aborted {
            info!(flight_number, "Launch aborted");
        } else {
            debug!(
                flight_number,
                matched = result.matched,
                modified = result.modified,
                "Launch not aborted"
            );
        }

        Ok(aborted)
    }
}
