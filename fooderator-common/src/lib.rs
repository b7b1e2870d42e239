//! # Fooderator Common Library
//!
//! Shared code for the Fooderator services including:
//! - Canonical product record and its tri-state fields
//! - Nutrient vocabulary and nutrition maps
//! - Fill-only merge of partial product records
//! - Configuration loading
//! - Supported translation languages

pub mod config;
pub mod error;
pub mod field;
pub mod languages;
pub mod nutrients;
pub mod product;

pub use error::{Error, Result};
pub use field::Field;
pub use nutrients::{Basis, Nutrient, Nutrition, NutritionKey};
pub use product::{merge, ProductRecord, Provenance, TextSlot};
