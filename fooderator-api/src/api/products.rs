//! Product lookup and language list

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use fooderator_common::languages::{self, DEFAULT_LANGUAGE, LANGUAGES};
use fooderator_common::ProductRecord;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::translator::translate_product;
use crate::{ApiError, ApiResult, AppState};

/// Accepted barcode lengths (EAN-8/UPC-E through GTIN-14)
const BARCODE_LENGTH: std::ops::RangeInclusive<usize> = 6..=14;

/// Query string of `GET /api/product/:barcode`
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Target language code; defaults to English
    pub lang: Option<String>,
}

/// GET /api/languages
///
/// Supported translation targets, code → display name.
pub async fn list_languages() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(LANGUAGES.iter().copied().collect())
}

/// GET /api/product/:barcode?lang=code
///
/// **Errors:**
/// - 400 Bad Request: barcode is not 6-14 digits
/// - 404 Not Found: no source knows the barcode
pub async fn get_product(
    State(state): State<AppState>,
    Path(raw_barcode): Path<String>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<ProductRecord>> {
    let barcode = validate_barcode(&raw_barcode)?;
    let lang = query
        .lang
        .as_deref()
        .map(|l| l.trim().to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    info!(barcode = %barcode, lang = %lang, "Product lookup");

    let record = state
        .resolver
        .resolve(barcode, &state.credentials)
        .await
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if lang == DEFAULT_LANGUAGE {
        return Ok(Json(record));
    }
    let Some(language) = languages::display_name(&lang) else {
        debug!(lang = %lang, "Unsupported language requested, returning English");
        return Ok(Json(record));
    };
    debug!(barcode = %barcode, language, "Translating product");

    let translated = translate_product(record, &lang, state.translator.as_ref()).await;
    Ok(Json(translated))
}

/// Trim and check a barcode path segment
pub fn validate_barcode(raw: &str) -> ApiResult<&str> {
    let barcode = raw.trim();
    if BARCODE_LENGTH.contains(&barcode.len()) && barcode.bytes().all(|b| b.is_ascii_digit()) {
        Ok(barcode)
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid barcode '{}': expected 6-14 digits",
            barcode
        )))
    }
}

/// Build product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/api/languages", get(list_languages))
        .route("/api/product/:barcode", get(get_product))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_barcode() {
        assert_eq!(validate_barcode("5449000000996").unwrap(), "5449000000996");
        assert_eq!(validate_barcode(" 049000006346 ").unwrap(), "049000006346");
        assert_eq!(validate_barcode("123456").unwrap(), "123456");
        assert_eq!(validate_barcode("12345678901234").unwrap(), "12345678901234");
    }

    #[test]
    fn test_validate_barcode_rejects() {
        for bad in ["", "12345", "123456789012345", "54490000abc96", "5449-000-0996", "１２３４５６"] {
            assert!(
                matches!(validate_barcode(bad), Err(ApiError::BadRequest(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
