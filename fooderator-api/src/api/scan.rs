//! Barcode scanning from an uploaded image

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::scanner::decode_image_payload;
use crate::{ApiError, ApiResult, AppState};

/// Request payload for `POST /api/scan-barcode`
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Base64 image, bare or as a `data:` URI
    #[serde(default)]
    pub image: Option<String>,
}

/// Response payload for `POST /api/scan-barcode`
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub barcode: String,
    #[serde(rename = "type")]
    pub symbology: String,
}

/// POST /api/scan-barcode
///
/// **Request:** `{"image": "data:image/png;base64,..."}`
/// **Response:** `{"barcode": "5449000000996", "type": "EAN13"}`
///
/// **Errors:**
/// - 400 Bad Request: no image, bad base64 or unreadable image
/// - 404 Not Found: image holds no barcode
pub async fn scan_barcode(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> ApiResult<Json<ScanResponse>> {
    let Json(request) = payload?;
    let image = request
        .image
        .filter(|image| !image.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("No image provided".to_string()))?;

    let bytes = decode_image_payload(&image)?;

    let decoder = state.decoder.clone();
    let decoded = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("Barcode decoder task failed: {}", e)))??;

    let found = decoded.ok_or_else(|| ApiError::NotFound("No barcode found in image".to_string()))?;
    info!(barcode = %found.text, symbology = %found.symbology, "Barcode scanned");

    Ok(Json(ScanResponse {
        barcode: found.text,
        symbology: found.symbology,
    }))
}

/// Build scan routes
pub fn scan_routes() -> Router<AppState> {
    Router::new().route("/api/scan-barcode", post(scan_barcode))
}
