//! Launch scheduling
//!
//! User-submitted launches must target a planet already in the catalog and
//! receive the next flight number. Numbers are handed out by a single
//! writer: the [`FlightSequence`] lock is held from reading the stored
//! maximum until the new launch is written, so two schedule calls in the
//! same process can never compute the same number.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::model::{Launch, NewLaunch};
use crate::store::{LaunchStore, PlanetStore, StoreError};

/// Treated as the latest flight number when no launch is stored, so the
/// first scheduled launch is flight 100
pub const DEFAULT_LATEST_FLIGHT_NUMBER: i64 = 99;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("No matching planet found: {target}")]
    UnknownTarget { target: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Single-writer flight number sequence
#[derive(Debug, Default)]
pub struct FlightSequence {
    last_issued: Mutex<Option<i64>>,
}

impl FlightSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next number after both the last one issued here and the store's
    /// current maximum. Launches synchronized after startup can raise the
    /// stored maximum, so both are consulted.
    fn next_after(last_issued: Option<i64>, stored_latest: Option<i64>) -> i64 {
        let floor = stored_latest.unwrap_or(DEFAULT_LATEST_FLIGHT_NUMBER);
        last_issued.map_or(floor, |last| last.max(floor)) + 1
    }
}

pub struct LaunchScheduler {
    launches: Arc<dyn LaunchStore>,
    planets: Arc<dyn PlanetStore>,
    sequence: FlightSequence,
}

impl LaunchScheduler {
    pub fn new(launches: Arc<dyn LaunchStore>, planets: Arc<dyn PlanetStore>) -> Self {
        Self {
            launches,
            planets,
            sequence: FlightSequence::new(),
        }
    }

    /// Validate the target, assign a flight number and store the launch
    pub async fn schedule(&self, request: NewLaunch) -> Result<Launch, ScheduleError> {
        if self.planets.find_planet(&request.target).await?.is_none() {
            return Err(ScheduleError::UnknownTarget {
                target: request.target,
            });
        }

        let mut last_issued = self.sequence.last_issued.lock().await;
        let stored_latest = self.launches.latest_flight_number().await?;
        let flight_number = FlightSequence::next_after(*last_issued, stored_latest);

        let launch = request.into_launch(flight_number);
        self.launches.upsert_launch(&launch).await?;
        *last_issued = Some(flight_number);

        info!(
            flight_number,
            mission = %launch.mission,
            target = ?launch.target,
            "Launch scheduled"
        );

        Ok(launch)
    }
}
