//! Launch and planet catalog for the orbital service.
//!
//! The catalog is populated at startup from two external sources (a remote
//! launch feed and a Kepler observations table) and then mutated by
//! user-submitted launches and aborts.

pub mod catalog;
pub mod feed;
pub mod lifecycle;
pub mod model;
pub mod planets;
pub mod query;
pub mod scheduler;
pub mod store;
pub mod sync;

pub use catalog::Catalog;
pub use feed::{FeedError, FeedResponse, HttpLaunchFeed, LaunchFeed, RemoteLaunch};
pub use lifecycle::LaunchLifecycle;
pub use model::{Launch, NewLaunch, Planet, DEFAULT_CUSTOMERS};
pub use planets::{
    is_habitable, CsvRowSource, LoadError, LoadReport, PlanetLoader, PlanetRow, Row,
    RowSourceError,
};
pub use query::{CatalogQuery, Pagination};
pub use scheduler::{FlightSequence, LaunchScheduler, ScheduleError};
pub use store::{
    LaunchStore, MemoryStore, Page, PlanetStore, SqliteStore, StoreError, UpdateResult,
};
pub use sync::{LaunchSynchronizer, SyncError, SyncOutcome, BOOTSTRAP_SENTINEL_FLIGHT};
