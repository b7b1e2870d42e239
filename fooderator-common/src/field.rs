//! Tri-state product fields
//!
//! Providers report missing data in two ways: they leave a field out (or send an
//! empty string), or they send a placeholder such as `"N/A"`. Both are "not yet
//! known" for merging, but a placeholder is more informative than nothing, so
//! the distinction is kept until the JSON boundary.
//!
//! Ingredients are classified more narrowly: only blank text and the
//! missing-ingredients sentinel count as not known, since the waterfall keys
//! off that field.

use crate::product::MISSING_INGREDIENTS;

/// Placeholder strings providers (and older clients) use in place of real data
pub const PLACEHOLDER_TEXTS: &[&str] = &[
    "Unknown",
    "Unknown Product",
    "Unknown Brand",
    "N/A",
    "Ingredients not available in database",
    "No allergen information available",
];

/// A product field that is absent, an explicit placeholder, or a known value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// The source did not supply this field
    #[default]
    Absent,
    /// The source reported the field as unknown
    Placeholder,
    /// A genuine value
    Known(T),
}

impl<T> Field<T> {
    /// True only for a genuine value
    pub fn is_known(&self) -> bool {
        matches!(self, Field::Known(_))
    }

    /// Borrow the genuine value, if any
    pub fn known(&self) -> Option<&T> {
        match self {
            Field::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Informativeness order used by merge: Known > Placeholder > Absent
    fn rank(&self) -> u8 {
        match self {
            Field::Absent => 0,
            Field::Placeholder => 1,
            Field::Known(_) => 2,
        }
    }

    /// Fill this field from `other` without ever overwriting a known value.
    ///
    /// Returns true if the field changed.
    pub fn fill_from(&mut self, other: &Field<T>) -> bool
    where
        T: Clone,
    {
        if self.is_known() || other.rank() <= self.rank() {
            return false;
        }
        *self = other.clone();
        true
    }
}

impl Field<String> {
    /// Classify a raw provider string.
    ///
    /// Blank or missing text is `Absent`, a known placeholder string is
    /// `Placeholder`, anything else is `Known` (trimmed).
    pub fn from_text(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            None | Some("") => Field::Absent,
            Some(t) if PLACEHOLDER_TEXTS.contains(&t) => Field::Placeholder,
            Some(t) => Field::Known(t.to_string()),
        }
    }

    /// Classify raw ingredient text.
    ///
    /// Any string other than blank text or the missing-ingredients sentinel is
    /// `Known`, `"N/A"` included.
    pub fn from_ingredients(text: Option<&str>) -> Self {
        match text.map(str::trim) {
            None | Some("") => Field::Absent,
            Some(MISSING_INGREDIENTS) => Field::Placeholder,
            Some(t) => Field::Known(t.to_string()),
        }
    }

    /// Classify the first non-blank candidate of a provider fallback chain
    pub fn first_of<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        Field::from_text(first_non_blank(candidates))
    }

    /// Replace a non-known field with a placeholder
    pub fn or_placeholder(self) -> Self {
        match self {
            Field::Known(v) => Field::Known(v),
            _ => Field::Placeholder,
        }
    }

    /// Render for the JSON boundary, using `fallback` for anything not known
    pub fn render<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Field::Known(value) => value.as_str(),
            _ => fallback,
        }
    }
}

/// First candidate with non-whitespace content
pub fn first_non_blank<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|t| !t.trim().is_empty())
}
