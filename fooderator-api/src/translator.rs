//! Translation of resolved products
//!
//! The provider is an opaque [`Translator`]; [`GoogleTranslator`] talks to the
//! public Google Translate web endpoint. [`translate_product`] translates each
//! text field and every nutrient label independently, so one failed call only
//! leaves that one piece in English.
//!
//! # API Reference
//! - Endpoint: `GET {base}/translate_a/single?client=gtx&sl=SRC&tl=DST&dt=t&q=TEXT`
//! - Response: nested arrays; `[0][i][0]` holds the translated segments

use async_trait::async_trait;
use fooderator_common::config::EndpointConfig;
use fooderator_common::{Field, Nutrient, ProductRecord, TextSlot};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::sources::USER_AGENT;

/// Google Translate web endpoint base URL
pub const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// Default timeout for one translation call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Source language meaning "detect"
pub const AUTO_DETECT: &str = "auto";

/// Nutrient label calls in flight at once
const LABEL_CONCURRENCY: usize = 4;

/// Translation error
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Network(String),

    #[error("Translation service returned {0}")]
    Api(u16),

    #[error("Unexpected translation response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        TranslationError::Network(err.to_string())
    }
}

/// Text translation capability
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`; `source_lang` may be [`AUTO_DETECT`]
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// Google Translate web endpoint client
pub struct GoogleTranslator {
    http_client: Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TranslationError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, TranslationError> {
        Self::new(
            config.base_url_or(DEFAULT_BASE_URL),
            config.timeout_or(DEFAULT_TIMEOUT),
        )
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/translate_a/single", self.base_url);
        let source = google_language_code(source_lang);
        let target = google_language_code(target_lang);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Api(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslationError::Parse(e.to_string()))?;
        join_segments(&body)
    }
}

/// Google expects region subtags upper-cased (`zh-CN`)
fn google_language_code(code: &str) -> String {
    match code.split_once('-') {
        Some((lang, region)) => format!("{}-{}", lang, region.to_ascii_uppercase()),
        None => code.to_string(),
    }
}

/// Concatenate the translated segments of a `translate_a/single` response
fn join_segments(body: &Value) -> Result<String, TranslationError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Parse("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(TranslationError::Parse("no translated text".to_string()));
    }
    Ok(translated)
}

/// Translate the user-facing text of `record` into `target_lang`.
///
/// Known name/brand/ingredients/allergens are replaced by their translation;
/// fields without a value get a translated placeholder. Every nutrient label
/// is translated into `nutrition_labels`, falling back to English per label.
/// `translated_to` is always set; `translation_error` holds the first failure.
pub async fn translate_product(
    mut record: ProductRecord,
    target_lang: &str,
    translator: &dyn Translator,
) -> ProductRecord {
    let mut errors: Vec<String> = Vec::new();

    for slot in TextSlot::ALL {
        let (text, is_known) = match record.text(slot) {
            Field::Known(text) => (text.clone(), true),
            _ => (slot.sentinel().to_string(), false),
        };

        match translator.translate(&text, AUTO_DETECT, target_lang).await {
            Ok(translated) if is_known => *record.text_mut(slot) = Field::Known(translated),
            Ok(translated) => {
                record.localized_placeholders.insert(slot, translated);
            }
            Err(e) => {
                warn!(
                    barcode = %record.barcode(),
                    field = slot.as_str(),
                    target_lang = %target_lang,
                    error = %e,
                    "Field translation failed"
                );
                errors.push(e.to_string());
            }
        }
    }

    let label_calls: Vec<_> = Nutrient::ALL
        .iter()
        .map(|&nutrient| translate_label(translator, nutrient, target_lang))
        .collect();
    let label_results: Vec<(Nutrient, Result<String, TranslationError>)> = stream::iter(label_calls)
        .buffered(LABEL_CONCURRENCY)
        .collect()
        .await;

    let mut labels = BTreeMap::new();
    let mut failed_labels = 0usize;
    for (nutrient, result) in label_results {
        let label = match result {
            Ok(label) => label,
            Err(e) => {
                failed_labels += 1;
                errors.push(e.to_string());
                nutrient.label().to_string()
            }
        };
        labels.insert(nutrient, label);
    }
    if failed_labels > 0 {
        warn!(
            barcode = %record.barcode(),
            failed = failed_labels,
            target_lang = %target_lang,
            "Some nutrient labels left untranslated"
        );
    }

    record.nutrition_labels = Some(labels);
    record.translated_to = Some(target_lang.to_string());
    if let Some(first) = errors.into_iter().next() {
        record.translation_error = Some(first);
    }

    debug!(
        barcode = %record.barcode(),
        target_lang = %target_lang,
        failed = record.translation_error.is_some(),
        "Product translated"
    );

    record
}

async fn translate_label(
    translator: &dyn Translator,
    nutrient: Nutrient,
    target_lang: &str,
) -> (Nutrient, Result<String, TranslationError>) {
    let result = translator
        .translate(nutrient.label(), AUTO_DETECT, target_lang)
        .await;
    (nutrient, result)
}
