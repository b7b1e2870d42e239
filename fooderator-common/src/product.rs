//! Canonical product record and fill-only merge
//!
//! A `ProductRecord` is created by the first source that knows the barcode and
//! is then only ever enriched through [`merge`]. Legacy sentinel strings exist
//! only in the JSON form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::field::Field;
use crate::nutrients::{Nutrient, Nutrition};

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const UNKNOWN_BRAND: &str = "Unknown Brand";
pub const MISSING_INGREDIENTS: &str = "Ingredients not available in database";
pub const MISSING_ALLERGENS: &str = "No allergen information available";

/// Text fields that carry a sentinel in the JSON form and get translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextSlot {
    Name,
    Brand,
    Ingredients,
    Allergens,
}

impl TextSlot {
    pub const ALL: [TextSlot; 4] = [
        TextSlot::Name,
        TextSlot::Brand,
        TextSlot::Ingredients,
        TextSlot::Allergens,
    ];

    /// Legacy sentinel rendered when the field is not known
    pub fn sentinel(self) -> &'static str {
        match self {
            TextSlot::Name => UNKNOWN_PRODUCT,
            TextSlot::Brand => UNKNOWN_BRAND,
            TextSlot::Ingredients => MISSING_INGREDIENTS,
            TextSlot::Allergens => MISSING_ALLERGENS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextSlot::Name => "name",
            TextSlot::Brand => "brand",
            TextSlot::Ingredients => "ingredients",
            TextSlot::Allergens => "allergens",
        }
    }
}

/// Append-only list of the sources that contributed to a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance(Vec<String>);

impl Provenance {
    pub fn single(source: impl Into<String>) -> Self {
        Provenance(vec![source.into()])
    }

    pub fn extend_from(&mut self, other: &Provenance) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn contains(&self, source: &str) -> bool {
        self.0.iter().any(|s| s == source)
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the comma-joined JSON form
    pub fn from_joined(joined: &str) -> Self {
        Provenance(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Unified product record for one barcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ProductJson", from = "ProductJson")]
pub struct ProductRecord {
    barcode: String,
    pub name: Field<String>,
    pub brand: Field<String>,
    pub ingredients: Field<String>,
    pub allergens: Field<String>,
    pub categories: Field<String>,
    pub countries: Field<String>,
    pub stores: Field<String>,
    pub image_url: Field<String>,
    /// `None` when the source carries no nutrition mapping at all
    pub nutrition: Option<Nutrition>,
    pub data_source: Provenance,
    pub nutrition_labels: Option<BTreeMap<Nutrient, String>>,
    pub translated_to: Option<String>,
    pub translation_error: Option<String>,
    /// Translated sentinel text, rendered instead of the English sentinel
    pub localized_placeholders: BTreeMap<TextSlot, String>,
}

impl ProductRecord {
    /// Empty record for `barcode` contributed by `source`
    pub fn new(barcode: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            name: Field::Absent,
            brand: Field::Absent,
            ingredients: Field::Absent,
            allergens: Field::Absent,
            categories: Field::Absent,
            countries: Field::Absent,
            stores: Field::Absent,
            image_url: Field::Absent,
            nutrition: None,
            data_source: Provenance::single(source),
            nutrition_labels: None,
            translated_to: None,
            translation_error: None,
            localized_placeholders: BTreeMap::new(),
        }
    }

    pub fn barcode(&self) -> &str {
        &self.barcode
    }

    /// True once some source has supplied ingredient text other than the
    /// missing-ingredients sentinel
    pub fn is_ingredients_complete(&self) -> bool {
        self.ingredients.is_known()
    }

    pub fn text(&self, slot: TextSlot) -> &Field<String> {
        match slot {
            TextSlot::Name => &self.name,
            TextSlot::Brand => &self.brand,
            TextSlot::Ingredients => &self.ingredients,
            TextSlot::Allergens => &self.allergens,
        }
    }

    pub fn text_mut(&mut self, slot: TextSlot) -> &mut Field<String> {
        match slot {
            TextSlot::Name => &mut self.name,
            TextSlot::Brand => &mut self.brand,
            TextSlot::Ingredients => &mut self.ingredients,
            TextSlot::Allergens => &mut self.allergens,
        }
    }

    /// Text shown for `slot` when it is not known
    pub fn placeholder_text(&self, slot: TextSlot) -> &str {
        self.localized_placeholders
            .get(&slot)
            .map(String::as_str)
            .unwrap_or_else(|| slot.sentinel())
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut Field<String>); 8] {
        [
            ("name", &mut self.name),
            ("brand", &mut self.brand),
            ("ingredients", &mut self.ingredients),
            ("allergens", &mut self.allergens),
            ("categories", &mut self.categories),
            ("countries", &mut self.countries),
            ("stores", &mut self.stores),
            ("image_url", &mut self.image_url),
        ]
    }

    fn fields(&self) -> [&Field<String>; 8] {
        [
            &self.name,
            &self.brand,
            &self.ingredients,
            &self.allergens,
            &self.categories,
            &self.countries,
            &self.stores,
            &self.image_url,
        ]
    }
}

/// Merge `secondary` into `primary`, filling gaps only.
///
/// Known values in `primary` are never overwritten; a missing `secondary`
/// leaves `primary` unchanged. Provenance of `secondary` is appended.
pub fn merge(mut primary: ProductRecord, secondary: Option<&ProductRecord>) -> ProductRecord {
    let Some(secondary) = secondary else {
        return primary;
    };

    let mut filled = Vec::new();
    for ((field_name, target), source) in primary.fields_mut().into_iter().zip(secondary.fields()) {
        if target.fill_from(source) {
            filled.push(field_name);
        }
    }

    if let Some(existing) = primary.nutrition.as_mut() {
        if let Some(other) = &secondary.nutrition {
            existing.fill_from(other);
        }
    } else {
        primary.nutrition = secondary.nutrition.clone();
    }

    if primary.nutrition_labels.is_none() {
        primary.nutrition_labels = secondary.nutrition_labels.clone();
    }
    if primary.translated_to.is_none() {
        primary.translated_to = secondary.translated_to.clone();
    }
    if primary.translation_error.is_none() {
        primary.translation_error = secondary.translation_error.clone();
    }
    for (slot, text) in &secondary.localized_placeholders {
        primary
            .localized_placeholders
            .entry(*slot)
            .or_insert_with(|| text.clone());
    }

    primary.data_source.extend_from(&secondary.data_source);

    debug!(
        barcode = %primary.barcode,
        from = %secondary.data_source,
        filled = ?filled,
        "Merged product record"
    );

    primary
}

/// Legacy JSON shape of a product record
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductJson {
    barcode: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    ingredients: String,
    #[serde(default)]
    allergens: String,
    #[serde(default)]
    categories: String,
    #[serde(default)]
    countries: String,
    #[serde(default)]
    stores: String,
    #[serde(default)]
    image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nutrition: Option<Nutrition>,
    #[serde(default)]
    data_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nutrition_labels: Option<BTreeMap<Nutrient, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translated_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    translation_error: Option<String>,
}

impl From<ProductRecord> for ProductJson {
    fn from(record: ProductRecord) -> Self {
        let text = |slot: TextSlot| record.text(slot).render(record.placeholder_text(slot)).to_string();
        let optional = |field: &Field<String>| field.render("").to_string();

        ProductJson {
            name: text(TextSlot::Name),
            brand: text(TextSlot::Brand),
            ingredients: text(TextSlot::Ingredients),
            allergens: text(TextSlot::Allergens),
            categories: optional(&record.categories),
            countries: optional(&record.countries),
            stores: optional(&record.stores),
            image_url: optional(&record.image_url),
            data_source: record.data_source.to_string(),
            barcode: record.barcode,
            nutrition: record.nutrition,
            nutrition_labels: record.nutrition_labels,
            translated_to: record.translated_to,
            translation_error: record.translation_error,
        }
    }
}

impl From<ProductJson> for ProductRecord {
    fn from(json: ProductJson) -> Self {
        let field = |s: &str| Field::from_text(Some(s));

        ProductRecord {
            name: field(&json.name),
            brand: field(&json.brand),
            ingredients: Field::from_ingredients(Some(&json.ingredients)),
            allergens: field(&json.allergens),
            categories: field(&json.categories),
            countries: field(&json.countries),
            stores: field(&json.stores),
            image_url: field(&json.image_url),
            data_source: Provenance::from_joined(&json.data_source),
            barcode: json.barcode,
            nutrition: json.nutrition,
            nutrition_labels: json.nutrition_labels,
            translated_to: json.translated_to,
            translation_error: json.translation_error,
            localized_placeholders: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrients::NutritionKey;

    fn known(s: &str) -> Field<String> {
        Field::Known(s.to_string())
    }

    fn off_record() -> ProductRecord {
        let mut record = ProductRecord::new("5449000000996", "OpenFoodFacts");
        record.name = known("Coca-Cola");
        record.ingredients = Field::Placeholder;
        record.allergens = Field::Placeholder;
        record.brand = Field::Placeholder;
        let mut nutrition = Nutrition::new();
        nutrition.insert(Nutrient::Sugars, 10.6);
        record.nutrition = Some(nutrition);
        record
    }

    fn usda_record() -> ProductRecord {
        let mut record = ProductRecord::new("5449000000996", "USDA FoodData Central");
        record.name = known("COCA-COLA CLASSIC");
        record.brand = known("Coca-Cola Co");
        record.ingredients = known("Carbonated water, sugar...");
        let mut nutrition = Nutrition::new();
        nutrition.insert(Nutrient::Sugars, 11.0);
        nutrition.insert(Nutrient::Sodium, 4.0);
        record.nutrition = Some(nutrition);
        record
    }

    #[test]
    fn test_merge_with_nothing_is_identity() {
        let record = off_record();
        assert_eq!(merge(record.clone(), None), record);
    }

    #[test]
    fn test_merge_is_fill_only() {
        let merged = merge(off_record(), Some(&usda_record()));

        assert_eq!(merged.name, known("Coca-Cola"));
        assert_eq!(merged.brand, known("Coca-Cola Co"));
        assert_eq!(merged.ingredients, known("Carbonated water, sugar..."));
        assert_eq!(merged.allergens, Field::Placeholder);
        assert_eq!(merged.barcode(), "5449000000996");
    }

    #[test]
    fn test_merge_nutrition_key_by_key() {
        let merged = merge(off_record(), Some(&usda_record()));
        let nutrition = merged.nutrition.unwrap();

        assert_eq!(nutrition.get(Nutrient::Sugars), Some(10.6));
        assert_eq!(nutrition.get(Nutrient::Sodium), Some(4.0));
    }

    #[test]
    fn test_merge_adopts_nutrition_wholesale() {
        let mut upc = ProductRecord::new("5449000000996", "UPC Database");
        upc.name = known("Coke 330ml");
        assert!(upc.nutrition.is_none());

        let merged = merge(upc, Some(&usda_record()));
        assert_eq!(merged.nutrition, usda_record().nutrition);
    }

    #[test]
    fn test_merge_keeps_placeholder_over_absent() {
        let mut upc = ProductRecord::new("5449000000996", "UPC Database");
        upc.name = known("Coke");
        let merged = merge(off_record(), Some(&upc));

        assert_eq!(merged.ingredients, Field::Placeholder);
        assert!(!merged.is_ingredients_complete());
    }

    #[test]
    fn test_merge_accumulates_provenance() {
        let merged = merge(off_record(), Some(&usda_record()));
        assert_eq!(
            merged.data_source.to_string(),
            "OpenFoodFacts, USDA FoodData Central"
        );
    }

    #[test]
    fn test_merge_twice_leaves_fields_unchanged() {
        let secondary = usda_record();
        let once = merge(off_record(), Some(&secondary));
        let twice = merge(once.clone(), Some(&secondary));

        assert_eq!(twice.name, once.name);
        assert_eq!(twice.brand, once.brand);
        assert_eq!(twice.ingredients, once.ingredients);
        assert_eq!(twice.nutrition, once.nutrition);
        // provenance is append-only and not deduplicated
        assert_eq!(twice.data_source.entries().len(), 3);
    }

    #[test]
    fn test_json_renders_sentinels() {
        let mut record = ProductRecord::new("0000000000000", "UPC Database");
        record.categories = known("Beverages");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], UNKNOWN_PRODUCT);
        assert_eq!(json["brand"], UNKNOWN_BRAND);
        assert_eq!(json["ingredients"], MISSING_INGREDIENTS);
        assert_eq!(json["allergens"], MISSING_ALLERGENS);
        assert_eq!(json["categories"], "Beverages");
        assert_eq!(json["stores"], "");
        assert_eq!(json["data_source"], "UPC Database");
        assert!(json.get("nutrition").is_none());
        assert!(json.get("translated_to").is_none());
    }

    #[test]
    fn test_json_round_trip_restores_placeholders() {
        let record = off_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: ProductRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.ingredients, Field::Placeholder);
        assert_eq!(back.brand, Field::Placeholder);
        assert_eq!(back.name, known("Coca-Cola"));
        assert_eq!(back.stores, Field::Absent);
        assert_eq!(
            back.nutrition.unwrap().get(NutritionKey::per_100g(Nutrient::Sugars)),
            Some(10.6)
        );
    }

    #[test]
    fn test_literal_na_ingredients_are_complete() {
        let mut record = ProductRecord::new("5449000000996", "OpenFoodFacts");
        record.ingredients = Field::from_ingredients(Some("N/A"));
        assert!(record.is_ingredients_complete());

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""ingredients":"N/A""#));
        let back: ProductRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ingredients, known("N/A"));
    }

    #[test]
    fn test_localized_placeholder_rendering() {
        let mut record = off_record();
        record
            .localized_placeholders
            .insert(TextSlot::Ingredients, "Ingredientes no disponibles".to_string());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["ingredients"], "Ingredientes no disponibles");
        assert_eq!(json["allergens"], MISSING_ALLERGENS);
    }

    #[test]
    fn test_provenance_parsing() {
        let provenance = Provenance::from_joined("OpenFoodFacts, UPC Database");
        assert_eq!(provenance.entries().len(), 2);
        assert!(provenance.contains("UPC Database"));
        assert!(Provenance::from_joined("").is_empty());
    }
}
