//! Product source adapters
//!
//! Each adapter turns one external product database into [`ProductRecord`]s.
//! Adapters are queried one after another by the resolver, so a failing
//! provider must never abort resolution: [`ProductSource::lookup`] collapses
//! every error into "not found" after logging it.
//!
//! # Sources (priority order)
//! 1. [`OpenFoodFactsSource`] - comprehensive open database, ingredients + nutrition
//! 2. [`UpcItemDbSource`] - UPC catalog, names/brands/images only
//! 3. [`UsdaSource`] - USDA FoodData Central, requires an API key

pub mod openfoodfacts;
pub mod tags;
pub mod upcitemdb;
pub mod usda;

pub use openfoodfacts::OpenFoodFactsSource;
pub use upcitemdb::UpcItemDbSource;
pub use usda::UsdaSource;

use async_trait::async_trait;
use fooderator_common::config::Credentials;
use fooderator_common::ProductRecord;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// User-Agent sent to every provider
pub const USER_AGENT: &str = concat!("Fooderator/", env!("CARGO_PKG_VERSION"));

/// Source lookup error
#[derive(Debug, Error)]
pub enum SourceError {
    /// Provider has no product for this barcode
    #[error("Product not found")]
    NotFound,

    /// Provider needs a credential that was not supplied
    #[error("No credential configured")]
    NoCredential,

    /// Network failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Provider answered with an error status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Provider response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

/// An external product database keyed by barcode
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Provenance name recorded in `data_source`
    fn name(&self) -> &'static str;

    /// Query the provider.
    ///
    /// # Errors
    /// `SourceError::NotFound` for unknown barcodes, `NoCredential` when a
    /// required key is missing, and `Network`/`Api`/`Parse` for provider failures.
    async fn fetch(
        &self,
        barcode: &str,
        credentials: &Credentials,
    ) -> Result<ProductRecord, SourceError>;

    /// Query the provider, treating every failure as "not found"
    async fn lookup(&self, barcode: &str, credentials: &Credentials) -> Option<ProductRecord> {
        match self.fetch(barcode, credentials).await {
            Ok(record) => {
                info!(
                    source = self.name(),
                    barcode = %barcode,
                    ingredients_complete = record.is_ingredients_complete(),
                    "Product found"
                );
                Some(record)
            }
            Err(SourceError::NotFound) => {
                debug!(source = self.name(), barcode = %barcode, "Product not in source");
                None
            }
            Err(SourceError::NoCredential) => {
                debug!(source = self.name(), "Skipping source: no credential configured");
                None
            }
            Err(e) => {
                warn!(source = self.name(), barcode = %barcode, error = %e, "Source lookup failed");
                None
            }
        }
    }
}

/// Build the HTTP client shared by one adapter
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::Network(e.to_string()))
}

/// Map a non-success HTTP status to a source error
pub(crate) async fn status_error(response: reqwest::Response) -> SourceError {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return SourceError::NotFound;
    }
    let body = response.text().await.unwrap_or_default();
    SourceError::Api(status.as_u16(), body)
}
