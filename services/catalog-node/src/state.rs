use anyhow::Context;
use orbital_catalog::{Catalog, HttpLaunchFeed, SqliteStore};
use orbital_core::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
}

impl AppState {
    /// Open the configured SQLite store
    pub fn open(config: Config) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&config.store.database_path).with_context(|| {
            format!(
                "failed to open catalog store at {}",
                config.store.database_path.display()
            )
        })?;

        Ok(Self::with_catalog(config, Catalog::new(Arc::new(store))))
    }

    pub fn with_catalog(config: Config, catalog: Catalog) -> Self {
        AppState { config, catalog }
    }

    /// Populate planets, then launches. Either failure stops startup.
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        let report = self
            .catalog
            .planet_loader(self.config.planets.row_error_policy)
            .load_csv(&self.config.planets.csv_path)
            .await
            .with_context(|| {
                format!(
                    "failed to load planets from {}",
                    self.config.planets.csv_path.display()
                )
            })?;

        info!(
            saved = report.saved,
            failed = report.failed,
            total = report.total_planets,
            "Planet catalog loaded"
        );

        let feed = HttpLaunchFeed::new(
            self.config.feed.url.clone(),
            Duration::from_secs(self.config.feed.timeout_secs),
        )?;

        let outcome = self
            .catalog
            .synchronizer(Arc::new(feed), self.config.feed.sync_policy)
            .synchronize()
            .await
            .context("failed to synchronize launches")?;

        info!(?outcome, "Launch catalog ready");
        Ok(())
    }
}
