//! Free-text translation endpoint

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use fooderator_common::languages::DEFAULT_LANGUAGE;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::translator::AUTO_DETECT;
use crate::{ApiError, ApiResult, AppState};

/// Request payload for `POST /api/translate`
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_target")]
    pub target_lang: String,
    #[serde(default = "default_source")]
    pub source_lang: String,
}

fn default_target() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_source() -> String {
    AUTO_DETECT.to_string()
}

/// Response payload for `POST /api/translate`
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub original: String,
    pub translated: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// POST /api/translate
///
/// **Errors:**
/// - 400 Bad Request: missing or empty `text`
/// - 502 Bad Gateway: translation provider failed
pub async fn translate_text(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> ApiResult<Json<TranslateResponse>> {
    let Json(request) = payload?;
    let text = request
        .text
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No text provided".to_string()))?;

    let translated = state
        .translator
        .translate(&text, &request.source_lang, &request.target_lang)
        .await
        .map_err(|e| {
            warn!(target_lang = %request.target_lang, error = %e, "Translation failed");
            ApiError::Upstream(e.to_string())
        })?;

    Ok(Json(TranslateResponse {
        original: text,
        translated,
        source_lang: request.source_lang,
        target_lang: request.target_lang,
    }))
}

/// Build translation routes
pub fn translate_routes() -> Router<AppState> {
    Router::new().route("/api/translate", post(translate_text))
}
