//! Test utilities for catalog integration tests

use async_trait::async_trait;
use orbital_catalog::{FeedError, FeedResponse, LaunchFeed};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Kepler table excerpt: three habitable planets among six data rows
pub const KEPLER_CSV: &str = "\
# This file was produced by the NASA Exoplanet Archive  http://exoplanetarchive.ipac.caltech.edu
# Sun Jul 17 07:34:46 2022
#
# COLUMN kepid:          KepID
# COLUMN kepler_name:    Kepler Name
# COLUMN koi_disposition: Exoplanet Archive Disposition
# COLUMN koi_insol:      Insolation Flux [Earth flux]
# COLUMN koi_prad:       Planetary Radius [Earth radii]
#
kepid,kepoi_name,kepler_name,koi_disposition,koi_insol,koi_prad
10797460,K00752.01,Kepler-227 b,CONFIRMED,93.59,2.26
10854555,K00755.01,Kepler-664 b,CONFIRMED,1.11,1.2
4138008,K04087.01,Kepler-1410 b,CONFIRMED,1.05,1.38
8311864,K03138.01,Kepler-442 b,CONFIRMED,0.7,1.34
5640085,K00448.02,Kepler-62 f,CONFIRMED,0.42,1.41
11818800,K00777.01,,CANDIDATE,0.6,1.1
";

pub const HABITABLE_NAMES: [&str; 3] = ["Kepler-1410 b", "Kepler-442 b", "Kepler-62 f"];

/// Get a unique temporary database path
pub fn temp_db_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("orbital_{}_{}.db", label, uuid::Uuid::new_v4()))
}

/// Remove a SQLite database and its WAL side files
pub fn remove_db(path: &Path) {
    std::fs::remove_file(path).ok();
    std::fs::remove_file(format!("{}-wal", path.display())).ok();
    std::fs::remove_file(format!("{}-shm", path.display())).ok();
}

/// A remote launch record shaped like the feed delivers it
pub fn remote_launch(flight_number: i64, name: &str, upcoming: bool, customers: &[&str]) -> Value {
    json!({
        "flight_number": flight_number,
        "name": name,
        "rocket": { "name": if flight_number < 6 { "Falcon 1" } else { "Falcon 9" } },
        "date_local": "2008-09-28T11:15:00+12:00",
        "upcoming": upcoming,
        "success": if upcoming { Value::Null } else { Value::Bool(true) },
        "payloads": [ { "customers": customers } ]
    })
}

/// Remote launch set with the bootstrap sentinel (flight 1) included
pub fn remote_launches() -> Vec<Value> {
    vec![
        remote_launch(1, "FalconSat", false, &["DARPA"]),
        remote_launch(2, "DemoSat", false, &["DARPA"]),
        remote_launch(4, "RatSat", false, &["SpaceX"]),
        remote_launch(6, "Falcon 9 Test Flight", false, &["SpaceX"]),
        remote_launch(187, "Crew-5", true, &["NASA (CCP)"]),
    ]
}

/// Feed that replays whatever docs it currently holds
pub struct ScriptedFeed {
    status: u16,
    docs: Mutex<Vec<Value>>,
    calls: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new(status: u16, docs: Vec<Value>) -> Self {
        Self {
            status,
            docs: Mutex::new(docs),
            calls: AtomicUsize::new(0),
        }
    }

    /// Append records, as if the remote catalog grew
    pub fn push(&self, doc: Value) {
        self.docs.lock().unwrap().push(doc);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LaunchFeed for ScriptedFeed {
    async fn fetch_launches(&self) -> Result<FeedResponse, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let docs = if self.status == 200 {
            self.docs.lock().unwrap().clone()
        } else {
            Vec::new()
        };
        Ok(FeedResponse {
            status: self.status,
            docs,
        })
    }
}
