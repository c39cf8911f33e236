//! Caller-facing catalog operations
//!
//! [`Catalog`] wires the scheduler, lifecycle manager and query service to
//! one pair of collections and hands out the startup loaders bound to the
//! same stores.

use orbital_core::{RowErrorPolicy, SyncPolicy};
use std::sync::Arc;

use crate::feed::LaunchFeed;
use crate::lifecycle::LaunchLifecycle;
use crate::model::{Launch, NewLaunch, Planet};
use crate::planets::PlanetLoader;
use crate::query::{CatalogQuery, Pagination};
use crate::scheduler::{LaunchScheduler, ScheduleError};
use crate::store::{self, LaunchStore, PlanetStore};
use crate::sync::LaunchSynchronizer;

pub struct Catalog {
    launches: Arc<dyn LaunchStore>,
    planets: Arc<dyn PlanetStore>,
    scheduler: LaunchScheduler,
    lifecycle: LaunchLifecycle,
    query: CatalogQuery,
}

impl Catalog {
    /// Catalog over one store that holds both collections
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: LaunchStore + PlanetStore + 'static,
    {
        Self::from_parts(store.clone(), store)
    }

    pub fn from_parts(launches: Arc<dyn LaunchStore>, planets: Arc<dyn PlanetStore>) -> Self {
        Self {
            scheduler: LaunchScheduler::new(launches.clone(), planets.clone()),
            lifecycle: LaunchLifecycle::new(launches.clone()),
            query: CatalogQuery::new(launches.clone(), planets.clone()),
            launches,
            planets,
        }
    }

    pub fn synchronizer(&self, feed: Arc<dyn LaunchFeed>, policy: SyncPolicy) -> LaunchSynchronizer {
        LaunchSynchronizer::new(feed, self.launches.clone()).with_policy(policy)
    }

    pub fn planet_loader(&self, policy: RowErrorPolicy) -> PlanetLoader {
        PlanetLoader::new(self.planets.clone()).with_policy(policy)
    }

    pub async fn schedule_launch(&self, request: NewLaunch) -> Result<Launch, ScheduleError> {
        self.scheduler.schedule(request).await
    }

    pub async fn abort_launch(&self, flight_number: i64) -> store::Result<bool> {
        self.lifecycle.abort_launch(flight_number).await
    }

    pub async fn launch_exists(&self, flight_number: i64) -> store::Result<bool> {
        self.lifecycle.launch_exists(flight_number).await
    }

    pub async fn list_launches(&self, pagination: Pagination) -> store::Result<Vec<Launch>> {
        self.query.list_launches(pagination).await
    }

    pub async fn list_planets(&self) -> store::Result<Vec<Planet>> {
        self.query.list_planets().await
    }
}
