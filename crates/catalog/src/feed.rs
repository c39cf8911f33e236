//! Remote launch feed
//!
//! The feed is queried once per synchronization run for the complete launch
//! set with the rocket and payload references resolved inline. Records come
//! back schema-less; [`RemoteLaunch`] is the typed boundary every record must
//! pass before it can become a [`Launch`].

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::model::Launch;

/// Errors talking to the remote feed
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Feed response could not be decoded: {0}")]
    Decode(String),
}

/// One batched feed response
#[derive(Debug, Clone)]
pub struct FeedResponse {
    /// Transport status code
    pub status: u16,
    /// Raw launch records
    pub docs: Vec<Value>,
}

impl FeedResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Source of remote launch records
#[async_trait]
pub trait LaunchFeed: Send + Sync {
    /// Fetch every launch, unpaginated
    async fn fetch_launches(&self) -> Result<FeedResponse, FeedError>;
}

/// Query body asking for all launches with rocket name and payload customers
pub fn launch_query() -> Value {
    json!({
        "query": {},
        "options": {
            "pagination": false,
            "populate": [
                { "path": "rocket", "select": { "name": 1 } },
                { "path": "payloads", "select": { "customers": 1 } }
            ]
        }
    })
}

/// Feed client over HTTP
pub struct HttpLaunchFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpLaunchFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[derive(Deserialize)]
struct QueryEnvelope {
    docs: Vec<Value>,
}

#[async_trait]
impl LaunchFeed for HttpLaunchFeed {
    async fn fetch_launches(&self) -> Result<FeedResponse, FeedError> {
        let response = self
            .client
            .post(&self.url)
            .json(&launch_query())
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(FeedResponse {
                status,
                docs: Vec::new(),
            });
        }

        let envelope: QueryEnvelope = response
            .json()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))?;

        debug!(status, records = envelope.docs.len(), "Launch feed responded");

        Ok(FeedResponse {
            status,
            docs: envelope.docs,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRocket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemotePayload {
    #[serde(default)]
    pub customers: Vec<String>,
}

/// A launch record as the feed delivers it
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLaunch {
    pub flight_number: i64,
    pub name: String,
    pub rocket: RemoteRocket,
    pub date_local: String,
    pub upcoming: bool,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub payloads: Vec<RemotePayload>,
}

impl RemoteLaunch {
    /// Decode one raw record
    pub fn from_value(value: Value) -> Result<Self, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// Normalize into a catalog launch.
    ///
    /// Customers are flattened in payload order, then customer order, and
    /// duplicates are kept.
    pub fn into_launch(self) -> Result<Launch, String> {
        let launch_date = DateTime::parse_from_rfc3339(&self.date_local)
            .map_err(|e| format!("invalid date_local '{}': {}", self.date_local, e))?;

        let customers = self
            .payloads
            .into_iter()
            .flat_map(|payload| payload.customers)
            .collect();

        Ok(Launch {
            flight_number: self.flight_number,
            mission: self.name,
            rocket: self.rocket.name,
            launch_date,
            target: None,
            upcoming: self.upcoming,
            success: self.success,
            customers,
        })
    }
}
