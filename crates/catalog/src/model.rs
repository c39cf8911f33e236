//! Catalog documents
//!
//! Field names serialize in camelCase so stored and served documents keep
//! the shape clients already consume (`flightNumber`, `keplerName`, ...).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Customer roster attached to every user-submitted launch
pub const DEFAULT_CUSTOMERS: [&str; 2] = ["NASA", "PPHI"];

/// A launch document, keyed by `flight_number`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Launch {
    /// Unique flight number
    pub flight_number: i64,

    /// Mission name
    pub mission: String,

    /// Rocket name
    pub rocket: String,

    /// Scheduled or actual launch time
    pub launch_date: DateTime<FixedOffset>,

    /// Destination planet (user-submitted launches only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Whether the launch is still pending
    pub upcoming: bool,

    /// Outcome; `None` while unknown
    pub success: Option<bool>,

    /// Customers across all payloads, in payload order
    #[serde(default)]
    pub customers: Vec<String>,
}

/// A habitable planet document, keyed by `kepler_name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    pub kepler_name: String,
}

impl Planet {
    pub fn new(kepler_name: impl Into<String>) -> Self {
        Self {
            kepler_name: kepler_name.into(),
        }
    }
}

/// A launch request submitted by a user
#[derive(Debug, Clone, PartialEq)]
pub struct NewLaunch {
    pub mission: String,
    pub rocket: String,
    pub launch_date: DateTime<FixedOffset>,
    /// `kepler_name` of the destination planet
    pub target: String,
}

impl NewLaunch {
    /// Materialize the request as a launch with the given flight number
    pub fn into_launch(self, flight_number: i64) -> Launch {
        Launch {
            flight_number,
            mission: self.mission,
            rocket: self.rocket,
            launch_date: self.launch_date,
            target: Some(self.target),
            upcoming: true,
            success: Some(true),
            customers: DEFAULT_CUSTOMERS.iter().map(|c| c.to_string()).collect(),
        }
    }
}
