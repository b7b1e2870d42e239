//! Open Food Facts source (primary)
//!
//! The most comprehensive source: ingredients in several languages, allergen
//! and trace tags, categories and a full nutriment table.
//!
//! # API Reference
//! - Endpoint: `GET {base}/api/v0/product/{barcode}.json`
//! - `status == 1` means the product exists; anything else is "not found"

use async_trait::async_trait;
use fooderator_common::config::{Credentials, EndpointConfig};
use fooderator_common::field::first_non_blank;
use fooderator_common::{Field, ProductRecord};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use super::tags::{combine_allergens, join_tags, MAX_CATEGORIES};
use super::{http_client, status_error, ProductSource, SourceError};
use crate::normalizers;

/// Open Food Facts base URL
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Default timeout for Open Food Facts requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Open Food Facts client
pub struct OpenFoodFactsSource {
    http_client: Client,
    base_url: String,
}

impl OpenFoodFactsSource {
    pub const NAME: &'static str = "OpenFoodFacts";

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
impl ProductSource for OpenFoodFactsSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn fetch(
        &self,
        barcode: &str,
        _credentials: &Credentials,
    ) -> Result<ProductRecord, SourceError> {
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode);
        debug!(barcode = %barcode, url = %url, "Querying Open Food Facts");

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: OffResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Open Food Facts response: {}", e)))?;

        match body.product {
            Some(product) if body.status == 1 => Ok(product_from_response(barcode, &product)),
            _ => Err(SourceError::NotFound),
        }
    }
}

/// Build a record from an OFF product object
pub fn product_from_response(barcode: &str, product: &OffProduct) -> ProductRecord {
    let mut record = ProductRecord::new(barcode, OpenFoodFactsSource::NAME);

    record.name = Field::first_of([
        product.product_name.as_deref(),
        product.product_name_en.as_deref(),
    ])
    .or_placeholder();

    record.brand = Field::from_text(product.brands.as_deref()).or_placeholder();

    record.ingredients = Field::from_ingredients(first_non_blank([
        product.ingredients_text.as_deref(),
        product.ingredients_text_en.as_deref(),
        product.ingredients_text_with_allergens.as_deref(),
        product.ingredients_text_fr.as_deref(),
        product.ingredients_text_es.as_deref(),
    ]))
    .or_placeholder();

    record.allergens = Field::from_text(Some(&allergen_text(product))).or_placeholder();

    record.categories = match non_blank(&product.categories) {
        Some(categories) => Field::from_text(Some(categories)),
        None => Field::from_text(Some(&join_tags(
            product.categories_tags.as_deref().unwrap_or_default(),
            Some(MAX_CATEGORIES),
        ))),
    };

    record.image_url = Field::first_of([
        product.image_url.as_deref(),
        product.image_front_url.as_deref(),
        product.image_small_url.as_deref(),
    ]);
    record.countries = Field::from_text(product.countries.as_deref());
    record.stores = Field::from_text(product.stores.as_deref());

    record.nutrition = Some(normalizers::openfoodfacts::normalize(&product.nutriments));

    record
}

/// Allergen statement including "may contain" traces
fn allergen_text(product: &OffProduct) -> String {
    let allergens = non_blank(&product.allergens)
        .or(non_blank(&product.allergens_en))
        .map(str::to_string)
        .unwrap_or_else(|| join_tags(product.allergens_tags.as_deref().unwrap_or_default(), None));

    let traces = match non_blank(&product.traces) {
        Some(traces) => traces.to_string(),
        None => join_tags(product.traces_tags.as_deref().unwrap_or_default(), None),
    };

    combine_allergens(&allergens, &traces)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

// ============================================================================
// Open Food Facts API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OffResponse {
    #[serde(default)]
    status: i64,
    product: Option<OffProduct>,
}

/// Subset of the OFF product object used by this adapter
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OffProduct {
    pub product_name: Option<String>,
    pub product_name_en: Option<String>,
    pub brands: Option<String>,
    pub ingredients_text: Option<String>,
    pub ingredients_text_en: Option<String>,
    pub ingredients_text_with_allergens: Option<String>,
    pub ingredients_text_fr: Option<String>,
    pub ingredients_text_es: Option<String>,
    pub allergens: Option<String>,
    pub allergens_en: Option<String>,
    pub allergens_tags: Option<Vec<String>>,
    pub traces: Option<String>,
    pub traces_tags: Option<Vec<String>>,
    pub categories: Option<String>,
    pub categories_tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub image_front_url: Option<String>,
    pub image_small_url: Option<String>,
    pub countries: Option<String>,
    pub stores: Option<String>,
    pub nutriments: Map<String, Value>,
}
