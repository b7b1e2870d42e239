//! Tag-list normalization
//!
//! Providers send categories, allergens and traces as taxonomy tags such as
//! `en:soft-drinks`. These are turned into readable, comma-joined text.

/// Maximum number of categories kept from a tag list
pub const MAX_CATEGORIES: usize = 3;

/// Capitalize the first letter of every word, lowercase the rest.
///
/// A word starts after any non-alphabetic character.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Strip a locale prefix (`en:`, `fr:`), replace `-` with spaces, title-case
pub fn clean_tag(tag: &str) -> String {
    let tag = tag.trim();
    let body = match tag.split_once(':') {
        Some((prefix, rest))
            if (2..=3).contains(&prefix.len())
                && prefix.chars().all(|c| c.is_ascii_lowercase()) =>
        {
            rest
        }
        _ => tag,
    };
    title_case(&body.replace('-', " "))
}

/// Clean and comma-join tags in source order, keeping at most `limit`
pub fn join_tags<S: AsRef<str>>(tags: &[S], limit: Option<usize>) -> String {
    let limit = limit.unwrap_or(usize::MAX);
    tags.iter()
        .map(|t| clean_tag(t.as_ref()))
        .filter(|t| !t.is_empty())
        .take(limit)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Combine allergen and trace text into one statement
pub fn combine_allergens(allergens: &str, traces: &str) -> String {
    let allergens = allergens.trim();
    let traces = traces.trim();
    match (allergens.is_empty(), traces.is_empty()) {
        (false, false) => format!("{}, May contain: {}", allergens, traces),
        (true, false) => format!("May contain: {}", traces),
        _ => allergens.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("soft drinks"), "Soft Drinks");
        assert_eq!(title_case("GLUTEN"), "Gluten");
        assert_eq!(title_case("nuts/peanuts"), "Nuts/Peanuts");
    }

    #[test]
    fn test_clean_tag() {
        assert_eq!(clean_tag("en:soft-drinks"), "Soft Drinks");
        assert_eq!(clean_tag("fr:boissons-gazeuses"), "Boissons Gazeuses");
        assert_eq!(clean_tag("milk"), "Milk");
    }

    #[test]
    fn test_categories_truncated_to_three() {
        let tags = vec![
            "en:beverages",
            "en:carbonated-drinks",
            "en:sodas",
            "en:colas",
            "en:sweetened-beverages",
        ];
        assert_eq!(
            join_tags(&tags, Some(MAX_CATEGORIES)),
            "Beverages, Carbonated Drinks, Sodas"
        );
    }

    #[test]
    fn test_join_keeps_order_without_limit() {
        let tags = vec!["en:milk", "en:soybeans", "en:gluten"];
        assert_eq!(join_tags(&tags, None), "Milk, Soybeans, Gluten");
    }

    #[test]
    fn test_combine_allergens() {
        assert_eq!(
            combine_allergens("Milk", "Nuts"),
            "Milk, May contain: Nuts"
        );
        assert_eq!(combine_allergens("", "Nuts"), "May contain: Nuts");
        assert_eq!(combine_allergens("Milk", ""), "Milk");
        assert_eq!(combine_allergens("", ""), "");
    }
}
