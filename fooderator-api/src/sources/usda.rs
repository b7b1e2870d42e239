//! USDA FoodData Central source (tertiary)
//!
//! FDC has no barcode endpoint, so the barcode is sent as a free-text search
//! restricted to branded foods and the result set is matched back to the
//! barcode locally.
//!
//! # API Reference
//! - Endpoint: `POST {base}/fdc/v1/foods/search?api_key=KEY`
//! - Requires an API key (https://fdc.nal.usda.gov/api-key-signup.html)

use async_trait::async_trait;
use fooderator_common::config::{Credentials, EndpointConfig};
use fooderator_common::{Field, ProductRecord};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{http_client, status_error, ProductSource, SourceError};
use crate::normalizers::{self, usda::UsdaNutrient};

/// FoodData Central base URL
pub const DEFAULT_BASE_URL: &str = "https://api.nal.usda.gov";

/// Default timeout for FoodData Central requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Number of search results inspected for a barcode match
const SEARCH_PAGE_SIZE: u32 = 10;

/// USDA FoodData Central client
pub struct UsdaSource {
    http_client: Client,
    base_url: String,
}

impl UsdaSource {
    pub const NAME: &'static str = "USDA FoodData Central";

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
impl ProductSource for UsdaSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn fetch(
        &self,
        barcode: &str,
        credentials: &Credentials,
    ) -> Result<ProductRecord, SourceError> {
        let api_key = credentials.usda_api_key().ok_or(SourceError::NoCredential)?;

        let url = format!("{}/fdc/v1/foods/search", self.base_url);
        debug!(barcode = %barcode, url = %url, "Searching USDA FoodData Central");

        let request = SearchRequest {
            query: barcode,
            data_type: &["Branded"],
            page_size: SEARCH_PAGE_SIZE,
        };

        let response = self
            .http_client
            .post(&url)
            .query(&[("api_key", api_key)])
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("FoodData Central response: {}", e)))?;

        debug!(barcode = %barcode, results = body.foods.len(), "FoodData Central search complete");

        select_match(barcode, &body.foods)
            .map(|food| product_from_food(barcode, food))
            .ok_or(SourceError::NotFound)
    }
}

/// Pick the search result for `barcode`.
///
/// An exact `gtinUpc` match wins; otherwise the first result whose description
/// texts contain the barcode.
pub fn select_match<'a>(barcode: &str, foods: &'a [UsdaFood]) -> Option<&'a UsdaFood> {
    foods
        .iter()
        .find(|food| food.gtin_upc.as_deref() == Some(barcode))
        .or_else(|| {
            foods.iter().find(|food| {
                food.description
                    .as_deref()
                    .is_some_and(|d| d.contains(barcode))
                    || food
                        .additional_descriptions
                        .as_deref()
                        .is_some_and(|d| d.contains(barcode))
            })
        })
}

/// Build a record from a matched FDC food
pub fn product_from_food(barcode: &str, food: &UsdaFood) -> ProductRecord {
    let mut record = ProductRecord::new(barcode, UsdaSource::NAME);
    record.name = Field::from_text(food.description.as_deref()).or_placeholder();
    record.brand = Field::from_text(food.brand_owner.as_deref()).or_placeholder();
    record.ingredients = Field::from_ingredients(food.ingredients.as_deref()).or_placeholder();
    record.categories = Field::from_text(food.branded_food_category.as_deref());
    record.nutrition = Some(normalizers::usda::normalize(&food.food_nutrients));
    record
}

// ============================================================================
// FoodData Central API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    data_type: &'a [&'a str],
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<UsdaFood>,
}

/// One branded food from a search result
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsdaFood {
    pub fdc_id: Option<u64>,
    pub description: Option<String>,
    pub additional_descriptions: Option<String>,
    pub gtin_upc: Option<String>,
    pub brand_owner: Option<String>,
    pub ingredients: Option<String>,
    pub branded_food_category: Option<String>,
    pub food_nutrients: Vec<UsdaNutrient>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fooderator_common::Nutrient;
    use serde_json::json;

    fn foods(value: serde_json::Value) -> Vec<UsdaFood> {
        let body: SearchResponse = serde_json::from_value(value).unwrap();
        body.foods
    }

    #[test]
    fn test_exact_gtin_match_preferred() {
        let foods = foods(json!({
            "foods": [
                { "fdcId": 1, "description": "COLA 049000006346 MULTIPACK", "gtinUpc": "049000006999" },
                { "fdcId": 2, "description": "COCA-COLA", "gtinUpc": "049000006346" }
            ]
        }));
        let food = select_match("049000006346", &foods).unwrap();
        assert_eq!(food.fdc_id, Some(2));
    }

    #[test]
    fn test_description_fallback() {
        let foods = foods(json!({
            "foods": [
                { "fdcId": 1, "description": "SPARKLING WATER", "gtinUpc": "1" },
                { "fdcId": 2, "description": "LEMONADE", "additionalDescriptions": "UPC 049000006346" }
            ]
        }));
        let food = select_match("049000006346", &foods).unwrap();
        assert_eq!(food.fdc_id, Some(2));
    }

    #[test]
    fn test_no_match() {
        let foods = foods(json!({
            "foods": [{ "fdcId": 1, "description": "SPARKLING WATER", "gtinUpc": "00049000006346" }]
        }));
        assert!(select_match("049000006346", &foods).is_none());
        assert!(select_match("049000006346", &[]).is_none());
    }

    #[test]
    fn test_food_mapping() {
        let foods = foods(json!({
            "foods": [{
                "fdcId": 2,
                "description": "COCA-COLA",
                "gtinUpc": "049000006346",
                "brandOwner": "Coca-Cola USA Operations",
                "ingredients": "CARBONATED WATER, HIGH FRUCTOSE CORN SYRUP, CARAMEL COLOR",
                "brandedFoodCategory": "Soda",
                "foodNutrients": [
                    { "nutrientName": "Sodium, Na", "unitName": "MG", "value": 4.0 },
                    { "nutrientName": "Sugars, total including NLEA", "unitName": "G", "value": 10.6 }
                ]
            }]
        }));
        let record = product_from_food("049000006346", &foods[0]);

        assert!(record.is_ingredients_complete());
        assert_eq!(
            record.brand.known().map(String::as_str),
            Some("Coca-Cola USA Operations")
        );
        assert_eq!(record.allergens, Field::Absent);
        assert_eq!(record.categories.known().map(String::as_str), Some("Soda"));
        let nutrition = record.nutrition.unwrap();
        assert_eq!(nutrition.get(Nutrient::Salt), Some(10.0));
        assert_eq!(record.data_source.to_string(), "USDA FoodData Central");
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        // Unroutable base URL: a network attempt would fail with Network, not NoCredential
        let source = UsdaSource::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        let result = source.fetch("049000006346", &Credentials::default()).await;
        assert!(matches!(result, Err(SourceError::NoCredential)));

        let blank = Credentials {
            usda_api_key: Some("  ".to_string()),
        };
        assert!(source.lookup("049000006346", &blank).await.is_none());
    }

    #[test]
    fn test_search_request_shape() {
        let request = SearchRequest {
            query: "049000006346",
            data_type: &["Branded"],
            page_size: SEARCH_PAGE_SIZE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({ "query": "049000006346", "dataType": ["Branded"], "pageSize": 10 })
        );
    }
}
