//! Habitable planet filter and loader
//!
//! Rows arrive from a header-driven tabular source as column name to string
//! mappings. Each row is classified once, at load time, and only habitable
//! rows are written to the `planets` collection, keyed by Kepler name.

use orbital_core::RowErrorPolicy;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::model::Planet;
use crate::store::{PlanetStore, StoreError};

pub const DISPOSITION_COLUMN: &str = "koi_disposition";
pub const INSOLATION_COLUMN: &str = "koi_insol";
pub const RADIUS_COLUMN: &str = "koi_prad";
pub const KEPLER_NAME_COLUMN: &str = "kepler_name";

pub const CONFIRMED: &str = "CONFIRMED";
/// Exclusive insolation flux bounds, in Earth units
pub const MIN_INSOLATION: f64 = 0.36;
pub const MAX_INSOLATION: f64 = 1.11;
/// Exclusive upper bound on planet radius, in Earth radii
pub const MAX_RADIUS: f64 = 1.6;

/// One data row, column name to raw value
pub type Row = HashMap<String, String>;

/// The fields of a row that the habitability rule reads
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetRow {
    pub disposition: String,
    pub insolation_flux: Option<f64>,
    pub planet_radius: Option<f64>,
    pub kepler_name: Option<String>,
}

impl PlanetRow {
    /// Extract the classified fields. Values that do not parse as numbers
    /// become `None`, which never satisfies a bound.
    pub fn from_columns(row: &Row) -> Self {
        let number = |column: &str| row.get(column).and_then(|v| v.trim().parse::<f64>().ok());

        Self {
            disposition: row.get(DISPOSITION_COLUMN).cloned().unwrap_or_default(),
            insolation_flux: number(INSOLATION_COLUMN),
            planet_radius: number(RADIUS_COLUMN),
            kepler_name: row
                .get(KEPLER_NAME_COLUMN)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        }
    }

    pub fn is_habitable(&self) -> bool {
        let insolation_ok = self
            .insolation_flux
            .is_some_and(|flux| flux > MIN_INSOLATION && flux < MAX_INSOLATION);
        let radius_ok = self.planet_radius.is_some_and(|radius| radius < MAX_RADIUS);

        self.disposition == CONFIRMED && insolation_ok && radius_ok
    }
}

/// Classify a raw row
pub fn is_habitable(row: &Row) -> bool {
    PlanetRow::from_columns(row).is_habitable()
}

/// Errors raised by a row source
#[derive(Debug, Error)]
pub enum RowSourceError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// CSV rows with `#` comment lines skipped and the header row as keys
pub struct CsvRowSource<R> {
    headers: csv::StringRecord,
    records: csv::StringRecordsIntoIter<R>,
}

impl CsvRowSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RowSourceError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: io::Read> CsvRowSource<R> {
    pub fn from_reader(reader: R) -> Result<Self, RowSourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .has_headers(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }
}

impl<R: io::Read> Iterator for CsvRowSource<R> {
    type Item = Result<Row, RowSourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map_err(RowSourceError::from).map(|record| {
            self.headers
                .iter()
                .zip(record.iter())
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect()
        }))
    }
}

/// Planet load failures
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Planet source failed at row {row}: {source}")]
    Source {
        row: usize,
        #[source]
        source: RowSourceError,
    },

    #[error("Could not save planet at row {row}: {reason}")]
    Row { row: usize, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Counters for one load run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows consumed from the source
    pub rows_read: usize,
    /// Rows that passed the habitability rule
    pub habitable: usize,
    /// Habitable rows written to the store
    pub saved: usize,
    /// Habitable rows that could not be written
    pub failed: usize,
    /// Planets in the collection after the load
    pub total_planets: u64,
}

pub struct PlanetLoader {
    planets: Arc<dyn PlanetStore>,
    policy: RowErrorPolicy,
}

impl PlanetLoader {
    pub fn new(planets: Arc<dyn PlanetStore>) -> Self {
        Self {
            planets,
            policy: RowErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RowErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Consume `rows` to completion, saving every habitable planet.
    ///
    /// A source error aborts the load. A failed save is logged and counted
    /// under [`RowErrorPolicy::Continue`] and aborts under
    /// [`RowErrorPolicy::Abort`].
    pub async fn load<I>(&self, rows: I) -> Result<LoadReport, LoadError>
    where
        I: IntoIterator<Item = Result<Row, RowSourceError>>,
        I::IntoIter: Send,
    {
        let mut report = LoadReport::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row = row.map_err(|source| LoadError::Source { row: index, source })?;
            report.rows_read += 1;

            let planet_row = PlanetRow::from_columns(&row);
            if !planet_row.is_habitable() {
                continue;
            }
            report.habitable += 1;

            match self.save(planet_row).await {
                Ok(name) => {
                    debug!(kepler_name = %name, "Planet saved");
                    report.saved += 1;
                }
                Err(reason) => {
                    error!(row = index, %reason, "Could not save planet");
                    report.failed += 1;
                    if self.policy == RowErrorPolicy::Abort {
                        return Err(LoadError::Row { row: index, reason });
                    }
                }
            }
        }

        report.total_planets = self.planets.count_planets().await?;
        info!(
            habitable_planets = report.total_planets,
            rows_read = report.rows_read,
            failed = report.failed,
            "{} habitable planets found",
            report.total_planets
        );

        Ok(report)
    }

    /// Read a CSV file on the blocking pool, then load its rows
    pub async fn load_csv(&self, path: impl AsRef<Path>) -> Result<LoadReport, LoadError> {
        let path = path.as_ref().to_path_buf();
        let rows = tokio::task::spawn_blocking(move || {
            CsvRowSource::open(&path).map(|source| source.collect::<Vec<_>>())
        })
        .await
        .map_err(|e| RowSourceError::Io(io::Error::new(io::ErrorKind::Other, e)))
        .and_then(|rows| rows)
        .map_err(|source| LoadError::Source { row: 0, source })?;

        self.load(rows).await
    }

    async fn save(&self, row: PlanetRow) -> Result<String, String> {
        let name = row
            .kepler_name
            .ok_or_else(|| format!("missing {}", KEPLER_NAME_COLUMN))?;
        self.planets
            .upsert_planet(&Planet::new(name.clone()))
            .await
            .map_err(|e| e.to_string())?;
        Ok(name)
    }
}
