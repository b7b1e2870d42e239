//! Nutrient normalizers
//!
//! Map provider-specific nutrient keys or names onto the canonical
//! [`Nutrient`](fooderator_common::Nutrient) vocabulary. The mapping tables
//! are static data; unknown provider keys are dropped.

pub mod openfoodfacts;
pub mod usda;

use serde_json::Value;

/// Read a provider value as a number.
///
/// Accepts JSON numbers and numeric strings; `null`, `"N/A"` and anything
/// non-finite yield `None`.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case("N/A") {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
