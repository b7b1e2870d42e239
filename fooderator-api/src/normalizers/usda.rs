//! USDA FoodData Central nutrient normalizer
//!
//! FDC search results list nutrients by display name (`"Sodium, Na"`) with a
//! unit. Values are kept in the provider's units.

use fooderator_common::{Nutrient, Nutrition};
use serde::Deserialize;

/// FDC nutrient name → canonical nutrient
pub const USDA_NUTRIENTS: &[(&str, Nutrient)] = &[
    ("Energy", Nutrient::Energy),
    ("Total lipid (fat)", Nutrient::Fat),
    ("Fatty acids, total saturated", Nutrient::SaturatedFat),
    ("Fatty acids, total monounsaturated", Nutrient::MonounsaturatedFat),
    ("Fatty acids, total polyunsaturated", Nutrient::PolyunsaturatedFat),
    ("Fatty acids, total trans", Nutrient::TransFat),
    ("Cholesterol", Nutrient::Cholesterol),
    ("Carbohydrate, by difference", Nutrient::Carbohydrates),
    ("Fiber, total dietary", Nutrient::Fiber),
    ("Sugars, total including NLEA", Nutrient::Sugars),
    ("Sugars, added", Nutrient::AddedSugars),
    ("Protein", Nutrient::Proteins),
    ("Sodium, Na", Nutrient::Sodium),
    ("Potassium, K", Nutrient::Potassium),
    ("Calcium, Ca", Nutrient::Calcium),
    ("Iron, Fe", Nutrient::Iron),
    ("Magnesium, Mg", Nutrient::Magnesium),
    ("Phosphorus, P", Nutrient::Phosphorus),
    ("Zinc, Zn", Nutrient::Zinc),
    ("Copper, Cu", Nutrient::Copper),
    ("Manganese, Mn", Nutrient::Manganese),
    ("Selenium, Se", Nutrient::Selenium),
    ("Vitamin C, total ascorbic acid", Nutrient::VitaminC),
    ("Thiamin", Nutrient::VitaminB1),
    ("Riboflavin", Nutrient::VitaminB2),
    ("Niacin", Nutrient::Niacin),
    ("Pantothenic acid", Nutrient::PantothenicAcid),
    ("Vitamin B-6", Nutrient::VitaminB6),
    ("Folate, total", Nutrient::Folate),
    ("Vitamin B-12", Nutrient::VitaminB12),
    ("Vitamin A, RAE", Nutrient::VitaminA),
    ("Vitamin A, IU", Nutrient::VitaminAIu),
    ("Vitamin E (alpha-tocopherol)", Nutrient::VitaminE),
    ("Vitamin D (D2 + D3)", Nutrient::VitaminD),
    ("Vitamin K (phylloquinone)", Nutrient::VitaminK),
    ("Caffeine", Nutrient::Caffeine),
    ("Alcohol, ethyl", Nutrient::Alcohol),
];

/// One entry of an FDC `foodNutrients` list
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaNutrient {
    #[serde(default)]
    pub nutrient_name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_name: Option<String>,
}

fn canonical(entry: &UsdaNutrient) -> Option<Nutrient> {
    let name = entry.nutrient_name.as_deref()?;
    let nutrient = USDA_NUTRIENTS
        .iter()
        .find(|(fdc_name, _)| *fdc_name == name)
        .map(|(_, nutrient)| *nutrient)?;

    // FDC lists energy twice, once in kcal and once in kJ
    let is_kj = entry
        .unit_name
        .as_deref()
        .is_some_and(|unit| unit.eq_ignore_ascii_case("kJ"));
    if nutrient == Nutrient::Energy && is_kj {
        return Some(Nutrient::EnergyKj);
    }
    Some(nutrient)
}

/// Normalize an FDC `foodNutrients` list
pub fn normalize(food_nutrients: &[UsdaNutrient]) -> Nutrition {
    let mut nutrition = Nutrition::new();
    for entry in food_nutrients {
        let (Some(nutrient), Some(value)) = (canonical(entry), entry.value) else {
            continue;
        };
        if value.is_finite() {
            nutrition.insert(nutrient, value);
        }
    }

    nutrition.derive_salt();
    nutrition
}
