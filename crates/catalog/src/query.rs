//! Catalog reads and pagination

use serde::Deserialize;
use std::sync::Arc;

use crate::model::{Launch, Planet};
use crate::store::{LaunchStore, Page, PlanetStore, Result};

pub const DEFAULT_PAGE_NUMBER: u64 = 1;
/// A limit of zero returns every remaining document
pub const DEFAULT_PAGE_LIMIT: u64 = 0;

/// Page/limit pair as callers supply it.
///
/// Negative values are taken by absolute value; missing or zero `page`
/// falls back to 1 and missing `limit` to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn page_number(&self) -> u64 {
        match self.page.map(i64::unsigned_abs) {
            Some(0) | None => DEFAULT_PAGE_NUMBER,
            Some(page) => page,
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit.map_or(DEFAULT_PAGE_LIMIT, i64::unsigned_abs)
    }

    pub fn skip(&self) -> u64 {
        (self.page_number() - 1).saturating_mul(self.limit())
    }

    pub fn to_page(&self) -> Page {
        Page {
            skip: self.skip(),
            limit: self.limit(),
        }
    }
}

pub struct CatalogQuery {
    launches: Arc<dyn LaunchStore>,
    planets: Arc<dyn PlanetStore>,
}

impl CatalogQuery {
    pub fn new(launches: Arc<dyn LaunchStore>, planets: Arc<dyn PlanetStore>) -> Self {
        Self { launches, planets }
    }

    /// Launches ascending by flight number
    pub async fn list_launches(&self, pagination: Pagination) -> Result<Vec<Launch>> {
        self.launches.find_launches(pagination.to_page()).await
    }

    /// Planets in storage order
    pub async fn list_planets(&self) -> Result<Vec<Planet>> {
        self.planets.find_planets().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::DateTime;

    #[test]
    fn test_pagination_defaults() {
        let none = Pagination::default();
        assert_eq!(none.page_number(), 1);
        assert_eq!(none.limit(), 0);
        assert_eq!(none.to_page(), Page::all());
    }

    #[test]
    fn test_pagination_skip() {
        assert_eq!(Pagination::new(1, 0).skip(), 0);
        assert_eq!(Pagination::new(2, 10).skip(), 10);
        assert_eq!(Pagination::new(3, 50).to_page(), Page { skip: 100, limit: 50 });
    }

    #[test]
    fn test_pagination_takes_absolute_values() {
        let negative = Pagination::new(-2, -10);
        assert_eq!(negative.page_number(), 2);
        assert_eq!(negative.limit(), 10);
        assert_eq!(negative.skip(), 10);

        assert_eq!(Pagination::new(0, 10).page_number(), 1);
    }

    #[tokio::test]
    async fn test_list_launches_pages() {
        let store = Arc::new(MemoryStore::new());
        for n in (1..=25).rev() {
            store
                .upsert_launch(&Launch {
                    flight_number: n,
                    mission: format!("mission-{}", n),
                    rocket: "Falcon 9".to_string(),
                    launch_date: DateTime::parse_from_rfc3339("2019-01-11T10:31:00-05:00")
                        .unwrap(),
                    target: None,
                    upcoming: false,
                    success: Some(true),
                    customers: vec![],
                })
                .await
                .unwrap();
        }
        let query = CatalogQuery::new(store.clone(), store.clone());

        let all = query.list_launches(Pagination::new(1, 0)).await.unwrap();
        let numbers: Vec<i64> = all.iter().map(|l| l.flight_number).collect();
        assert_eq!(numbers, (1..=25).collect::<Vec<_>>());

        let second = query.list_launches(Pagination::new(2, 10)).await.unwrap();
        assert_eq!(second.len(), 10);
        assert_eq!(second[0].flight_number, 11);

        let third = query.list_launches(Pagination::new(3, 10)).await.unwrap();
        assert_eq!(third.len(), 5);

        assert!(query.list_planets().await.unwrap().is_empty());
    }
}
