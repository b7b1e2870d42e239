//! HTTP API handlers
//!
//! Routes:
//! - `GET  /api/languages`
//! - `GET  /api/product/:barcode?lang=code`
//! - `POST /api/scan-barcode`
//! - `POST /api/translate`
//! - `GET  /health`

pub mod health;
pub mod products;
pub mod scan;
pub mod translate;

pub use health::health_routes;
pub use products::product_routes;
pub use scan::scan_routes;
pub use translate::translate_routes;
