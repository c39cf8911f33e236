//! In-process store for tests and ephemeral nodes

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{LaunchStore, Page, PlanetStore, Result, UpdateResult};
use crate::model::{Launch, Planet};

/// Both collections held in memory.
///
/// Launches live in a `BTreeMap` so iteration is already sorted by flight
/// number; planets keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    launches: RwLock<BTreeMap<i64, Launch>>,
    planets: RwLock<Vec<Planet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LaunchStore for MemoryStore {
    async fn find_launch(&self, flight_number: i64) -> Result<Option<Launch>> {
        Ok(self.launches.read().await.get(&flight_number).cloned())
    }

    async fn find_launches(&self, page: Page) -> Result<Vec<Launch>> {
        let launches = self.launches.read().await;
        Ok(page.apply(launches.values().cloned()))
    }

    async fn latest_flight_number(&self) -> Result<Option<i64>> {
        Ok(self.launches.read().await.keys().next_back().copied())
    }

    async fn upsert_launch(&self, launch: &Launch) -> Result<()> {
        let mut launches = self.launches.write().await;
        let mut incoming = launch.clone();
        if incoming.target.is_none() {
            if let Some(existing) = launches.get(&launch.flight_number) {
                incoming.target = existing.target.clone();
            }
        }
        launches.insert(launch.flight_number, incoming);
        Ok(())
    }

    async fn update_launch_status(
        &self,
        flight_number: i64,
        upcoming: bool,
        success: Option<bool>,
    ) -> Result<UpdateResult> {
        let mut launches = self.launches.write().await;
        let Some(launch) = launches.get_mut(&flight_number) else {
            return Ok(UpdateResult::default());
        };

        if launch.upcoming == upcoming && launch.success == success {
            return Ok(UpdateResult {
                matched: 1,
                modified: 0,
            });
        }

        launch.upcoming = upcoming;
        launch.success = success;
        Ok(UpdateResult {
            matched: 1,
            modified: 1,
        })
    }

    async fn count_launches(&self) -> Result<u64> {
        Ok(self.launches.read().await.len() as u64)
    }
}

#[async_trait]
impl PlanetStore for MemoryStore {
    async fn find_planet(&self, kepler_name: &str) -> Result<Option<Planet>> {
        let planets = self.planets.read().await;
        Ok(planets.iter().find(|p| p.kepler_name == kepler_name).cloned())
    }

    async fn find_planets(&self) -> Result<Vec<Planet>> {
        Ok(self.planets.read().await.clone())
    }

    async fn upsert_planet(&self, planet: &Planet) -> Result<()> {
        let mut planets = self.planets.write().await;
        if !planets.iter().any(|p| p.kepler_name == planet.kepler_name) {
            planets.push(planet.clone());
        }
        Ok(())
    }

    async fn count_planets(&self) -> Result<u64> {
        Ok(self.planets.read().await.len() as u64)
    }
}
