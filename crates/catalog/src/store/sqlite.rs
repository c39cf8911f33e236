//! SQLite-backed document store
//!
//! Launch documents are persisted one row per flight number with the
//! customer list stored as a JSON array. Planets get a surrogate rowid so
//! reads come back in insertion order.
//!
//! # Guarantees
//!
//! - Upserts use `ON CONFLICT DO UPDATE`, a single atomic statement
//! - Status updates never insert and report matched/modified counts
//! - WAL journal mode for crash recovery

use async_trait::async_trait;
use chrono::DateTime;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::{LaunchStore, Page, PlanetStore, Result, StoreError, UpdateResult};
use crate::model::{Launch, Planet};

const LAUNCH_COLUMNS: &str =
    "flight_number, mission, rocket, launch_date, target, upcoming, success, customers";

/// Raw launch row before type conversion
struct LaunchRow {
    flight_number: i64,
    mission: String,
    rocket: String,
    launch_date: String,
    target: Option<String>,
    upcoming: bool,
    success: Option<bool>,
    customers: String,
}

impl LaunchRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            flight_number: row.get(0)?,
            mission: row.get(1)?,
            rocket: row.get(2)?,
            launch_date: row.get(3)?,
            target: row.get(4)?,
            upcoming: row.get(5)?,
            success: row.get(6)?,
            customers: row.get(7)?,
        })
    }

    fn into_launch(self) -> Result<Launch> {
        let launch_date =
            DateTime::parse_from_rfc3339(&self.launch_date).map_err(|e| {
                StoreError::CorruptDocument {
                    key: format!("launches/{}", self.flight_number),
                    reason: format!("bad launch_date '{}': {}", self.launch_date, e),
                }
            })?;
        let customers = serde_json::from_str(&self.customers)?;

        Ok(Launch {
            flight_number: self.flight_number,
            mission: self.mission,
            rocket: self.rocket,
            launch_date,
            target: self.target,
            upcoming: self.upcoming,
            success: self.success,
            customers,
        })
    }
}

/// Catalog store on a single SQLite connection.
///
/// Statements run on the blocking thread pool; the async methods only
/// await their completion.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Create or open a catalog database at the specified path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), "Opening catalog store");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS launches (
                flight_number INTEGER PRIMARY KEY,
                mission TEXT NOT NULL,
                rocket TEXT NOT NULL,
                launch_date TEXT NOT NULL,
                target TEXT,
                upcoming INTEGER NOT NULL,
                success INTEGER,
                customers TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS planets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kepler_name TEXT NOT NULL UNIQUE
            );
            "#,
        )?;

        Ok(())
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            f(&mut conn)
        })
        .await?
    }
}

/// LIMIT/OFFSET pair for SQLite, or `None` when the window starts past any
/// row SQLite can address.
fn sql_window(page: Page) -> Option<(i64, i64)> {
    let offset = i64::try_from(page.skip).ok()?;
    // a negative LIMIT is unbounded in SQLite
    let limit = match page.limit {
        0 => -1,
        limit => i64::try_from(limit).unwrap_or(i64::MAX),
    };
    Some((limit, offset))
}

#[async_trait]
impl LaunchStore for SqliteStore {
    async fn find_launch(&self, flight_number: i64) -> Result<Option<Launch>> {
        let row = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        &format!("SELECT {} FROM launches WHERE flight_number = ?1", LAUNCH_COLUMNS),
                        [flight_number],
                        LaunchRow::from_row,
                    )
                    .optional()?)
            })
            .await?;

        row.map(LaunchRow::into_launch).transpose()
    }

    async fn find_launches(&self, page: Page) -> Result<Vec<Launch>> {
        let Some((limit, offset)) = sql_window(page) else {
            return Ok(Vec::new());
        };

        let rows = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM launches ORDER BY flight_number ASC LIMIT ?1 OFFSET ?2",
                    LAUNCH_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![limit, offset], LaunchRow::from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter().map(LaunchRow::into_launch).collect()
    }

    async fn latest_flight_number(&self) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let latest = conn.query_row("SELECT MAX(flight_number) FROM launches", [], |row| {
                row.get::<_, Option<i64>>(0)
            })?;
            Ok(latest)
        })
        .await
    }

    async fn upsert_launch(&self, launch: &Launch) -> Result<()> {
        let customers = serde_json::to_string(&launch.customers)?;
        let launch_date = launch.launch_date.to_rfc3339();
        let launch = launch.clone();

        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO launches (
                    flight_number, mission, rocket, launch_date,
                    target, upcoming, success, customers
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(flight_number) DO UPDATE SET
                    mission = excluded.mission,
                    rocket = excluded.rocket,
                    launch_date = excluded.launch_date,
                    target = COALESCE(excluded.target, launches.target),
                    upcoming = excluded.upcoming,
                    success = excluded.success,
                    customers = excluded.customers
                "#,
                params![
                    launch.flight_number,
                    launch.mission,
                    launch.rocket,
                    launch_date,
                    launch.target,
                    launch.upcoming,
                    launch.success,
                    customers,
                ],
            )?;

            debug!(flight_number = launch.flight_number, "Launch upserted");
            Ok(())
        })
        .await
    }

    async fn update_launch_status(
        &self,
        flight_number: i64,
        upcoming: bool,
        success: Option<bool>,
    ) -> Result<UpdateResult> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let matched: u64 = tx.query_row(
                "SELECT COUNT(*) FROM launches WHERE flight_number = ?1",
                [flight_number],
                |row| row.get::<_, i64>(0),
            )? as u64;

            let modified = tx.execute(
                r#"
                UPDATE launches SET upcoming = ?2, success = ?3
                WHERE flight_number = ?1
                  AND NOT (upcoming = ?2 AND success IS ?3)
                "#,
                params![flight_number, upcoming, success],
            )? as u64;

            tx.commit()?;

            Ok(UpdateResult { matched, modified })
        })
        .await
    }

    async fn count_launches(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM launches", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}

#[async_trait]
impl PlanetStore for SqliteStore {
    async fn find_planet(&self, kepler_name: &str) -> Result<Option<Planet>> {
        let kepler_name = kepler_name.to_string();
        self.with_conn(move |conn| {
            let planet = conn
                .query_row(
                    "SELECT kepler_name FROM planets WHERE kepler_name = ?1",
                    [&kepler_name],
                    |row| Ok(Planet::new(row.get::<_, String>(0)?)),
                )
                .optional()?;
            Ok(planet)
        })
        .await
    }

    async fn find_planets(&self) -> Result<Vec<Planet>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT kepler_name FROM planets ORDER BY id ASC")?;
            let planets = stmt
                .query_map([], |row| Ok(Planet::new(row.get::<_, String>(0)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(planets)
        })
        .await
    }

    async fn upsert_planet(&self, planet: &Planet) -> Result<()> {
        let kepler_name = planet.kepler_name.clone();
        self.with_conn(move |conn| {
            // the key is the whole document, so an existing row is already current
            conn.execute(
                "INSERT INTO planets (kepler_name) VALUES (?1) ON CONFLICT(kepler_name) DO NOTHING",
                [&kepler_name],
            )?;
            Ok(())
        })
        .await
    }

    async fn count_planets(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM planets", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}
