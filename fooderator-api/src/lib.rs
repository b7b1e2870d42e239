//! Fooderator HTTP service
//!
//! Looks up food products by barcode across several open databases, merges
//! the results and optionally translates them. Exposed as a library so the
//! router can be driven directly from integration tests.

pub mod api;
pub mod error;
pub mod logging;
pub mod normalizers;
pub mod resolver;
pub mod scanner;
pub mod sources;
pub mod translator;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use fooderator_common::config::Credentials;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::resolver::Resolver;
use crate::scanner::BarcodeDecoder;
use crate::translator::Translator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Ordered product sources
    pub resolver: Arc<Resolver>,
    /// Translation provider
    pub translator: Arc<dyn Translator>,
    /// Image barcode decoder
    pub decoder: Arc<dyn BarcodeDecoder>,
    /// Provider credentials resolved at startup
    pub credentials: Arc<Credentials>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        resolver: Resolver,
        translator: Arc<dyn Translator>,
        decoder: Arc<dyn BarcodeDecoder>,
        credentials: Credentials,
    ) -> Self {
        Self {
            resolver: Arc::new(resolver),
            translator,
            decoder,
            credentials: Arc::new(credentials),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::product_routes())
        .merge(api::scan_routes())
        .merge(api::translate_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
