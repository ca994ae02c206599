use anyhow::Result;
use async_trait::async_trait;

use crate::api::types::{ListingQuery, Page};
use crate::models::{Enquiry, Property};

/// Where the marketplace gets its data from.
/// The HTTP backend is the real implementation; snapshots cover offline use.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch one page of properties matching the query
    async fn fetch_listings(
        &self,
        page: u32,
        page_size: u32,
        query: &ListingQuery,
    ) -> Result<Page<Property>>;

    /// Fetch every enquiry, unpaginated
    async fn fetch_enquiries(&self) -> Result<Vec<Enquiry>>;

    /// Fetch a single property, e.g. to highlight it on the map
    async fn fetch_property(&self, id: &str) -> Result<Property>;

    /// Get the name of the data source
    fn source_name(&self) -> &'static str;
}
