//! Waterfall product resolution
//!
//! Sources are queried strictly in priority order. The first source is always
//! asked; each later source only while the accumulated record still lacks
//! genuine ingredient text.

use fooderator_common::config::{Credentials, ProvidersConfig};
use fooderator_common::{merge, ProductRecord};
use std::sync::Arc;
use tracing::{debug, info};

use crate::sources::{
    OpenFoodFactsSource, ProductSource, SourceError, UpcItemDbSource, UsdaSource,
};

/// Ordered list of product sources
pub struct Resolver {
    sources: Vec<Arc<dyn ProductSource>>,
}

impl Resolver {
    /// Resolver over `sources`, highest priority first
    pub fn with_sources(sources: Vec<Arc<dyn ProductSource>>) -> Self {
        Self { sources }
    }

    /// Default chain: Open Food Facts, UPCitemdb, USDA FoodData Central
    pub fn from_config(providers: &ProvidersConfig) -> Result<Self, SourceError> {
        let sources: Vec<Arc<dyn ProductSource>> = vec![
            Arc::new(OpenFoodFactsSource::from_config(&providers.openfoodfacts)?),
            Arc::new(UpcItemDbSource::from_config(&providers.upcitemdb)?),
            Arc::new(UsdaSource::from_config(&providers.usda)?),
        ];
        Ok(Self::with_sources(sources))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve `barcode` into a merged record.
    ///
    /// Returns `None` only when no source produced a record.
    pub async fn resolve(&self, barcode: &str, credentials: &Credentials) -> Option<ProductRecord> {
        let mut accumulator: Option<ProductRecord> = None;

        for (position, source) in self.sources.iter().enumerate() {
            let complete = accumulator
                .as_ref()
                .is_some_and(ProductRecord::is_ingredients_complete);
            if position > 0 && complete {
                debug!(
                    barcode = %barcode,
                    skipped = source.name(),
                    "Ingredients complete, skipping remaining sources"
                );
                break;
            }

            let Some(record) = source.lookup(barcode, credentials).await else {
                continue;
            };

            accumulator = Some(match accumulator {
                Some(current) => merge(current, Some(&record)),
                None => record,
            });
        }

        match &accumulator {
            Some(record) => info!(
                barcode = %barcode,
                data_source = %record.data_source,
                ingredients_complete = record.is_ingredients_complete(),
                "Product resolved"
            ),
            None => info!(barcode = %barcode, "Product not found in any source"),
        }

        accumulator
    }
}
