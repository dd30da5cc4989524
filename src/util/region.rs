//! Reference tables for derived descriptive attributes.

/// Maps a state code to its geographic region.
///
/// Returns `None` for states outside the reference table.
pub fn region_for_state(state: &str) -> Option<&'static str> {
    let region = match state.trim().to_ascii_uppercase().as_str() {
        "SP" | "RJ" | "MG" | "ES" => "Southeast",
        "RS" | "SC" | "PR" => "South",
        "BA" | "PE" | "CE" | "MA" | "PI" | "RN" | "PB" | "AL" | "SE" => "Northeast",
        "GO" | "MT" | "MS" | "DF" => "Central-West",
        "AM" | "PA" | "AC" | "RO" | "RR" | "AP" | "TO" => "North",
        _ => return None,
    };

    Some(region)
}

/// Maps a raw product category name to its top-level category.
pub fn category_l1(category_name: &str) -> Option<&'static str> {
    let l1 = match category_name.trim().to_ascii_lowercase().as_str() {
        "electronics" => "Electronics",
        "fashion" => "Fashion & Accessories",
        "home_garden" => "Home & Garden",
        "sports" => "Sports & Outdoors",
        "books" => "Books & Media",
        "toys" => "Toys & Games",
        "health_beauty" => "Health & Beauty",
        "automotive" => "Automotive",
        "food" => "Food & Beverages",
        "furniture" => "Furniture & Decor",
        _ => return None,
    };

    Some(l1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_states() {
        assert_eq!(region_for_state("SP"), Some("Southeast"));
        assert_eq!(region_for_state(" rs "), Some("South"));
        assert_eq!(region_for_state("DF"), Some("Central-West"));
        assert_eq!(region_for_state("XX"), None);
    }

    #[test]
    fn maps_categories() {
        assert_eq!(category_l1("health_beauty"), Some("Health & Beauty"));
        assert_eq!(category_l1("unknown_category"), None);
    }
}
