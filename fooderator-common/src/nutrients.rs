//! Canonical nutrient vocabulary
//!
//! Every provider nomenclature is mapped onto this closed set. Values are kept
//! per unit basis: a per-serving figure never shares a key with a per-100g one.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Standard sodium-to-salt conversion factor
pub const SODIUM_TO_SALT: f64 = 2.5;

/// Suffix for nutrients only reported per serving
const PER_SERVING_SUFFIX: &str = "_per_serving";

macro_rules! nutrients {
    ($($variant:ident => $key:literal, $label:literal;)*) => {
        /// A canonical nutrient
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Nutrient {
            $($variant,)*
        }

        impl Nutrient {
            /// The full vocabulary in display order
            pub const ALL: &'static [Nutrient] = &[$(Nutrient::$variant,)*];

            /// Canonical key (e.g. `saturated_fat`)
            pub fn key(self) -> &'static str {
                match self {
                    $(Nutrient::$variant => $key,)*
                }
            }

            /// English display label (e.g. "Saturated Fat")
            pub fn label(self) -> &'static str {
                match self {
                    $(Nutrient::$variant => $label,)*
                }
            }

            /// Look up a nutrient by canonical key
            pub fn from_key(key: &str) -> Option<Nutrient> {
                match key {
                    $($key => Some(Nutrient::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

nutrients! {
    Energy => "energy", "Calories";
    EnergyKj => "energy_kj", "Energy (kJ)";
    Fat => "fat", "Total Fat";
    SaturatedFat => "saturated_fat", "Saturated Fat";
    MonounsaturatedFat => "monounsaturated_fat", "Monounsaturated Fat";
    PolyunsaturatedFat => "polyunsaturated_fat", "Polyunsaturated Fat";
    TransFat => "trans_fat", "Trans Fat";
    Cholesterol => "cholesterol", "Cholesterol";
    Carbohydrates => "carbohydrates", "Total Carbohydrates";
    Sugars => "sugars", "Sugars";
    AddedSugars => "added_sugars", "Added Sugars";
    Fiber => "fiber", "Dietary Fiber";
    Proteins => "proteins", "Protein";
    Salt => "salt", "Salt";
    Sodium => "sodium", "Sodium";
    Potassium => "potassium", "Potassium";
    Calcium => "calcium", "Calcium";
    Iron => "iron", "Iron";
    Magnesium => "magnesium", "Magnesium";
    Phosphorus => "phosphorus", "Phosphorus";
    Zinc => "zinc", "Zinc";
    Copper => "copper", "Copper";
    Manganese => "manganese", "Manganese";
    Selenium => "selenium", "Selenium";
    Iodine => "iodine", "Iodine";
    Chloride => "chloride", "Chloride";
    VitaminA => "vitamin_a", "Vitamin A";
    VitaminAIu => "vitamin_a_iu", "Vitamin A (IU)";
    VitaminC => "vitamin_c", "Vitamin C";
    VitaminD => "vitamin_d", "Vitamin D";
    VitaminE => "vitamin_e", "Vitamin E";
    VitaminK => "vitamin_k", "Vitamin K";
    VitaminB1 => "vitamin_b1", "Thiamin (B1)";
    VitaminB2 => "vitamin_b2", "Riboflavin (B2)";
    Niacin => "niacin", "Niacin (B3)";
    VitaminB6 => "vitamin_b6", "Vitamin B6";
    Folate => "folate", "Folate";
    VitaminB12 => "vitamin_b12", "Vitamin B12";
    PantothenicAcid => "pantothenic_acid", "Pantothenic Acid";
    Biotin => "biotin", "Biotin";
    Caffeine => "caffeine", "Caffeine";
    Alcohol => "alcohol", "Alcohol";
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Nutrient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Nutrient {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Nutrient::from_key(&key)
            .ok_or_else(|| de::Error::custom(format!("unknown nutrient key: {}", key)))
    }
}

/// Unit basis a nutrient value was reported against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Basis {
    /// Per 100 g / 100 ml (the default basis)
    Per100g,
    /// Per serving, only used when no per-100g figure exists
    PerServing,
}

/// Key of a nutrition map: a nutrient at a unit basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NutritionKey {
    pub nutrient: Nutrient,
    pub basis: Basis,
}

impl NutritionKey {
    pub fn per_100g(nutrient: Nutrient) -> Self {
        Self {
            nutrient,
            basis: Basis::Per100g,
        }
    }

    pub fn per_serving(nutrient: Nutrient) -> Self {
        Self {
            nutrient,
            basis: Basis::PerServing,
        }
    }
}

impl From<Nutrient> for NutritionKey {
    fn from(nutrient: Nutrient) -> Self {
        NutritionKey::per_100g(nutrient)
    }
}

impl fmt::Display for NutritionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.basis {
            Basis::Per100g => f.write_str(self.nutrient.key()),
            Basis::PerServing => write!(f, "{}{}", self.nutrient.key(), PER_SERVING_SUFFIX),
        }
    }
}

impl FromStr for NutritionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, basis) = match s.strip_suffix(PER_SERVING_SUFFIX) {
            Some(base) => (base, Basis::PerServing),
            None => (s, Basis::Per100g),
        };
        Nutrient::from_key(key)
            .map(|nutrient| NutritionKey { nutrient, basis })
            .ok_or_else(|| format!("unknown nutrient key: {}", s))
    }
}

impl Serialize for NutritionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NutritionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(de::Error::custom)
    }
}

/// Nutrition facts keyed by canonical nutrient and basis.
///
/// A missing key means unknown, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nutrition(BTreeMap<NutritionKey, f64>);

impl Nutrition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<NutritionKey>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: impl Into<NutritionKey>) -> Option<f64> {
        self.0.get(&key.into()).copied()
    }

    pub fn contains(&self, key: impl Into<NutritionKey>) -> bool {
        self.0.contains_key(&key.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, NutritionKey, f64> {
        self.0.iter()
    }

    /// Derive salt from sodium at every basis where salt was not supplied
    pub fn derive_salt(&mut self) {
        for basis in [Basis::Per100g, Basis::PerServing] {
            let sodium = NutritionKey {
                nutrient: Nutrient::Sodium,
                basis,
            };
            let salt = NutritionKey {
                nutrient: Nutrient::Salt,
                basis,
            };
            if let Some(value) = self.get(sodium) {
                self.0.entry(salt).or_insert(value * SODIUM_TO_SALT);
            }
        }
    }

    /// Add every key of `other` that this map lacks; existing values win
    pub fn fill_from(&mut self, other: &Nutrition) {
        for (key, value) in other.iter() {
            self.0.entry(*key).or_insert(*value);
        }
    }
}

impl FromIterator<(NutritionKey, f64)> for Nutrition {
    fn from_iter<I: IntoIterator<Item = (NutritionKey, f64)>>(iter: I) -> Self {
        Nutrition(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_keys_round_trip() {
        for nutrient in Nutrient::ALL {
            assert_eq!(Nutrient::from_key(nutrient.key()), Some(*nutrient));
            assert!(!nutrient.label().is_empty());
        }
        assert_eq!(Nutrient::ALL.len(), 42);
    }

    #[test]
    fn test_per_serving_key_format() {
        let key = NutritionKey::per_serving(Nutrient::Fat);
        assert_eq!(key.to_string(), "fat_per_serving");
        assert_eq!("fat_per_serving".parse::<NutritionKey>(), Ok(key));
        assert_eq!(
            "saturated_fat".parse::<NutritionKey>(),
            Ok(NutritionKey::per_100g(Nutrient::SaturatedFat))
        );
        assert!("unobtainium".parse::<NutritionKey>().is_err());
    }

    #[test]
    fn test_salt_derived_from_sodium() {
        let mut nutrition = Nutrition::new();
        nutrition.insert(Nutrient::Sodium, 200.0);
        nutrition.derive_salt();

        assert_eq!(nutrition.get(Nutrient::Sodium), Some(200.0));
        assert_eq!(nutrition.get(Nutrient::Salt), Some(500.0));
    }

    #[test]
    fn test_supplied_salt_is_kept() {
        let mut nutrition = Nutrition::new();
        nutrition.insert(Nutrient::Sodium, 0.4);
        nutrition.insert(Nutrient::Salt, 1.1);
        nutrition.derive_salt();

        assert_eq!(nutrition.get(Nutrient::Salt), Some(1.1));
    }

    #[test]
    fn test_salt_derivation_stays_within_basis() {
        let mut nutrition = Nutrition::new();
        nutrition.insert(NutritionKey::per_serving(Nutrient::Sodium), 0.1);
        nutrition.derive_salt();

        assert_eq!(nutrition.get(Nutrient::Salt), None);
        let salt = nutrition.get(NutritionKey::per_serving(Nutrient::Salt)).unwrap();
        assert!((salt - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_fill_from_keeps_existing_values() {
        let mut primary = Nutrition::new();
        primary.insert(Nutrient::Fat, 3.0);

        let mut secondary = Nutrition::new();
        secondary.insert(Nutrient::Fat, 9.0);
        secondary.insert(Nutrient::Proteins, 1.5);

        primary.fill_from(&secondary);
        assert_eq!(primary.get(Nutrient::Fat), Some(3.0));
        assert_eq!(primary.get(Nutrient::Proteins), Some(1.5));
    }

    #[test]
    fn test_json_keys_are_canonical_strings() {
        let mut nutrition = Nutrition::new();
        nutrition.insert(Nutrient::VitaminC, 12.0);
        nutrition.insert(NutritionKey::per_serving(Nutrient::Sugars), 10.6);

        let json = serde_json::to_value(&nutrition).unwrap();
        assert_eq!(json["vitamin_c"], 12.0);
        assert_eq!(json["sugars_per_serving"], 10.6);

        let back: Nutrition = serde_json::from_value(json).unwrap();
        assert_eq!(back, nutrition);
    }
}
