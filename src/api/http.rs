use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::traits::ListingSource;
use crate::api::types::{ListingQuery, Page};
use crate::config::AppConfig;
use crate::models::{Enquiry, Property};

/// Client for the marketplace REST backend
pub struct HttpListingSource {
    client: Client,
    base_url: String,
}

impl HttpListingSource {
    /// Create a client from the loaded configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to fetch {what}"))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Backend returned status {} for {}", status, what);
            anyhow::bail!("Failed to fetch {what}: {status}");
        }

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;
        debug!("Downloaded {} bytes of {}", body.len(), what);

        serde_json::from_str(&body).with_context(|| format!("Failed to parse {what}"))
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch_listings(
        &self,
        page: u32,
        page_size: u32,
        query: &ListingQuery,
    ) -> Result<Page<Property>> {
        let url = self.endpoint("properties");
        debug!("Fetching page {} of {} with {:?}", page, url, query);

        let request = self
            .client
            .get(&url)
            .query(&[("page", page), ("pageSize", page_size)])
            .query(query);

        let mut listing: Page<Property> = self.get_json(request, "properties").await?;
        listing.page = page;
        Ok(listing)
    }

    async fn fetch_enquiries(&self) -> Result<Vec<Enquiry>> {
        let url = self.endpoint("enquiries");
        debug!("Fetching URL: {}", url);

        self.get_json(self.client.get(&url), "enquiries").await
    }

    async fn fetch_property(&self, id: &str) -> Result<Property> {
        let url = self.endpoint(&format!("properties/{id}"));
        debug!("Fetching URL: {}", url);

        self.get_json(self.client.get(&url), "property").await
    }

    fn source_name(&self) -> &'static str {
        "HTTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_endpoints_without_double_slashes() {
        let config = AppConfig {
            api_base_url: "https://api.example.com/v1/".to_string(),
            ..AppConfig::default()
        };
        let source = HttpListingSource::new(&config).unwrap();

        assert_eq!(
            source.endpoint("/properties/p-1"),
            "https://api.example.com/v1/properties/p-1"
        );
        assert_eq!(source.source_name(), "HTTP");
    }
}
