//! UPCitemdb source (secondary)
//!
//! A retail catalog: good for names, brands, categories and images, but it has
//! no ingredient or allergen data. Its `description` field is a catalog blurb
//! and is deliberately never read as ingredients.

use async_trait::async_trait;
use fooderator_common::config::{Credentials, EndpointConfig};
use fooderator_common::{Field, ProductRecord};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{http_client, status_error, ProductSource, SourceError};

/// UPCitemdb base URL (trial tier, no key required)
pub const DEFAULT_BASE_URL: &str = "https://api.upcitemdb.com";

/// Default timeout for UPCitemdb requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// UPCitemdb client
pub struct UpcItemDbSource {
    http_client: Client,
    base_url: String,
}

impl UpcItemDbSource {
    pub const NAME: &'static str = "UPC Database";

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        Ok(Self {
            http_client: http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, SourceError> {
        Self::new(
            config.base_url_or(DEFAULT_BASE_URL),
            config.timeout_or(DEFAULT_TIMEOUT),
        )
    }
}

#[async_trait]
impl ProductSource for UpcItemDbSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn fetch(
        &self,
        barcode: &str,
        _credentials: &Credentials,
    ) -> Result<ProductRecord, SourceError> {
        let url = format!("{}/prod/trial/lookup", self.base_url);
        debug!(barcode = %barcode, url = %url, "Querying UPCitemdb");

        let response = self
            .http_client
            .get(&url)
            .query(&[("upc", barcode)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: UpcResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("UPCitemdb response: {}", e)))?;

        body.items
            .first()
            .map(|item| product_from_item(barcode, item))
            .ok_or(SourceError::NotFound)
    }
}

/// Build a record from the first catalog item
pub fn product_from_item(barcode: &str, item: &UpcItem) -> ProductRecord {
    let mut record = ProductRecord::new(barcode, UpcItemDbSource::NAME);
    record.name = Field::from_text(item.title.as_deref()).or_placeholder();
    record.brand = Field::from_text(item.brand.as_deref()).or_placeholder();
    record.categories = Field::from_text(item.category.as_deref());
    record.image_url = Field::from_text(item.images.first().map(String::as_str));
    record
}

// ============================================================================
// UPCitemdb API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpcResponse {
    #[serde(default)]
    items: Vec<UpcItem>,
}

/// Catalog item; `description` is intentionally not modelled
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpcItem {
    pub title: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub images: Vec<String>,
}
