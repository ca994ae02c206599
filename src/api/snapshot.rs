use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::traits::ListingSource;
use crate::api::types::{ListingQuery, Page};
use crate::models::{Enquiry, Property};
use crate::search::{
    fuzzy_search, partition_by_city, BhkFilter, CityMatcher, ViewerContext,
};

/// Saved marketplace data, as written by `--json` or exported from the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub enquiries: Vec<Enquiry>,
}

/// Serves listings from a snapshot, applying the backend's filters locally
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;

        info!(
            "Loaded {} properties and {} enquiries from {}",
            snapshot.properties.len(),
            snapshot.enquiries.len(),
            path.display()
        );
        Ok(Self::new(snapshot))
    }

    fn retains(property: &Property, query: &ListingQuery, bhk: BhkFilter) -> bool {
        query.category.map_or(true, |c| c == property.category)
            && query.property_type.map_or(true, |t| t == property.property_type)
            && query.source.map_or(true, |s| s == property.source)
            && query.min_price.map_or(true, |min| property.price >= min)
            && query.max_price.map_or(true, |max| property.price <= max)
            && query.featured.map_or(true, |f| f == property.featured)
            && bhk.matches(property.bhk)
    }
}

#[async_trait]
impl ListingSource for SnapshotSource {
    async fn fetch_listings(
        &self,
        page: u32,
        page_size: u32,
        query: &ListingQuery,
    ) -> Result<Page<Property>> {
        let bhk = match query.bhk.as_deref() {
            Some(value) => value.parse::<BhkFilter>()?,
            None => BhkFilter::All,
        };

        let candidates: Vec<&Property> = self
            .snapshot
            .properties
            .iter()
            .filter(|property| Self::retains(property, query, bhk))
            .collect();
        let searched = match query.search.as_deref() {
            Some(text) => fuzzy_search(candidates, text),
            None => candidates,
        };
        let viewer = ViewerContext::new(query.user_city.clone());
        let ranked = partition_by_city(searched, &CityMatcher::new(&viewer));

        Ok(Page::from_vec(
            ranked.into_iter().cloned().collect(),
            page,
            page_size,
        ))
    }

    async fn fetch_enquiries(&self) -> Result<Vec<Enquiry>> {
        Ok(self.snapshot.enquiries.clone())
    }

    async fn fetch_property(&self, id: &str) -> Result<Property> {
        self.snapshot
            .properties
            .iter()
            .find(|property| property.id == id)
            .cloned()
            .with_context(|| format!("No property with id {id} in snapshot"))
    }

    fn source_name(&self) -> &'static str {
        "Snapshot"
    }
}
