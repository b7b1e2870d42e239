//! Open Food Facts nutriment normalizer
//!
//! OFF reports each nutrient as `{name}_100g` and/or `{name}_serving`. The
//! per-100g figure is preferred; a per-serving figure is only kept, under a
//! `_per_serving` key, when no per-100g figure exists.

use fooderator_common::{Nutrient, Nutrition, NutritionKey};
use serde_json::{Map, Value};

use super::numeric;

/// OFF nutriment base name → canonical nutrient
pub const OFF_NUTRIENTS: &[(&str, Nutrient)] = &[
    ("energy-kcal", Nutrient::Energy),
    ("energy", Nutrient::EnergyKj),
    ("fat", Nutrient::Fat),
    ("saturated-fat", Nutrient::SaturatedFat),
    ("monounsaturated-fat", Nutrient::MonounsaturatedFat),
    ("polyunsaturated-fat", Nutrient::PolyunsaturatedFat),
    ("trans-fat", Nutrient::TransFat),
    ("cholesterol", Nutrient::Cholesterol),
    ("carbohydrates", Nutrient::Carbohydrates),
    ("sugars", Nutrient::Sugars),
    ("added-sugars", Nutrient::AddedSugars),
    ("fiber", Nutrient::Fiber),
    ("proteins", Nutrient::Proteins),
    ("salt", Nutrient::Salt),
    ("sodium", Nutrient::Sodium),
    ("vitamin-a", Nutrient::VitaminA),
    ("vitamin-c", Nutrient::VitaminC),
    ("vitamin-d", Nutrient::VitaminD),
    ("vitamin-e", Nutrient::VitaminE),
    ("vitamin-k", Nutrient::VitaminK),
    ("vitamin-b1", Nutrient::VitaminB1),
    ("vitamin-b2", Nutrient::VitaminB2),
    ("vitamin-b6", Nutrient::VitaminB6),
    ("vitamin-b12", Nutrient::VitaminB12),
    ("vitamin-pp", Nutrient::Niacin),
    ("folates", Nutrient::Folate),
    ("pantothenic-acid", Nutrient::PantothenicAcid),
    ("biotin", Nutrient::Biotin),
    ("calcium", Nutrient::Calcium),
    ("phosphorus", Nutrient::Phosphorus),
    ("iron", Nutrient::Iron),
    ("magnesium", Nutrient::Magnesium),
    ("zinc", Nutrient::Zinc),
    ("copper", Nutrient::Copper),
    ("manganese", Nutrient::Manganese),
    ("selenium", Nutrient::Selenium),
    ("iodine", Nutrient::Iodine),
    ("potassium", Nutrient::Potassium),
    ("chloride", Nutrient::Chloride),
    ("alcohol", Nutrient::Alcohol),
    ("caffeine", Nutrient::Caffeine),
];

/// Normalize an OFF `nutriments` object
pub fn normalize(nutriments: &Map<String, Value>) -> Nutrition {
    let value_of = |key: String| nutriments.get(&key).and_then(numeric);

    let mut nutrition = Nutrition::new();
    for (name, nutrient) in OFF_NUTRIENTS {
        if let Some(value) = value_of(format!("{}_100g", name)) {
            nutrition.insert(NutritionKey::per_100g(*nutrient), value);
        } else if let Some(value) = value_of(format!("{}_serving", name)) {
            nutrition.insert(NutritionKey::per_serving(*nutrient), value);
        }
    }

    nutrition.derive_salt();
    nutrition
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nutriments(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_maps_per_100g_keys() {
        let n = normalize(&nutriments(json!({
            "energy-kcal_100g": 42,
            "energy_100g": 180,
            "saturated-fat_100g": "0.1",
            "sugars_100g": 10.6,
            "vitamin-pp_100g": 0.002,
            "nova-group_100g": 4
        })));

        assert_eq!(n.get(Nutrient::Energy), Some(42.0));
        assert_eq!(n.get(Nutrient::EnergyKj), Some(180.0));
        assert_eq!(n.get(Nutrient::SaturatedFat), Some(0.1));
        assert_eq!(n.get(Nutrient::Sugars), Some(10.6));
        assert_eq!(n.get(Nutrient::Niacin), Some(0.002));
        assert_eq!(n.len(), 5);
    }

    #[test]
    fn test_skips_null_and_na_values() {
        let n = normalize(&nutriments(json!({
            "fat_100g": null,
            "proteins_100g": "N/A",
            "fiber_100g": 2
        })));

        assert!(!n.contains(Nutrient::Fat));
        assert!(!n.contains(Nutrient::Proteins));
        assert_eq!(n.get(Nutrient::Fiber), Some(2.0));
    }

    #[test]
    fn test_per_serving_only_gets_distinct_key() {
        let n = normalize(&nutriments(json!({
            "fat_serving": 3.2,
            "sugars_100g": 10.0,
            "sugars_serving": 33.0
        })));

        assert_eq!(n.get(NutritionKey::per_serving(Nutrient::Fat)), Some(3.2));
        assert!(!n.contains(Nutrient::Fat));
        assert_eq!(n.get(Nutrient::Sugars), Some(10.0));
        assert!(!n.contains(NutritionKey::per_serving(Nutrient::Sugars)));
    }

    #[test]
    fn test_salt_derived_when_missing() {
        let n = normalize(&nutriments(json!({ "sodium_100g": 200 })));
        assert_eq!(n.get(Nutrient::Sodium), Some(200.0));
        assert_eq!(n.get(Nutrient::Salt), Some(500.0));
    }

    #[test]
    fn test_provider_salt_preserved() {
        let n = normalize(&nutriments(json!({ "sodium_100g": 0.4, "salt_100g": 1.0 })));
        assert_eq!(n.get(Nutrient::Salt), Some(1.0));
    }
}
