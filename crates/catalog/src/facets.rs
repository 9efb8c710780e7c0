//! Brand facets.
//!
//! Facet labels keep the casing the service sent; selection and matching
//! compare lower-cased values.

use serde::Serialize;

use crate::filter::FilterState;
use crate::types::Product;

/// Key used to compare brands.
pub fn normalize_brand(brand: &str) -> String {
    brand.to_lowercase()
}

/// A brand checkbox: display label plus whether it is currently selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandFacet {
    pub label: String,
    pub selected: bool,
}

/// Pair each facet value with its selection state, in the order received.
pub fn brand_facets(brands: &[String], filters: &FilterState) -> Vec<BrandFacet> {
    brands
        .iter()
        .map(|label| BrandFacet {
            label: label.clone(),
            selected: filters.is_brand_selected(label),
        })
        .collect()
}

/// Distinct brands of `products` in order of first appearance, compared
/// case-insensitively. Empty brand names are skipped.
pub fn facets_from_products(products: &[Product]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    products
        .iter()
        .filter(|p| !p.brand.is_empty())
        .filter(|p| seen.insert(normalize_brand(&p.brand)))
        .map(|p| p.brand.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_brand(brand: &str) -> Product {
        Product {
            brand: brand.into(),
            similarity: 0.9,
            ..Product::default()
        }
    }

    #[test]
    fn facets_preserve_label_case_and_mark_selection() {
        let brands = vec!["SoundWave".to_string(), "AudioTech".to_string()];
        let filters = FilterState::default().with_brands(["soundwave"]);

        let facets = brand_facets(&brands, &filters);
        assert_eq!(
            facets,
            vec![
                BrandFacet {
                    label: "SoundWave".into(),
                    selected: true
                },
                BrandFacet {
                    label: "AudioTech".into(),
                    selected: false
                },
            ]
        );
    }

    #[test]
    fn facets_pass_duplicates_through() {
        let brands = vec!["Lumen".to_string(), "Lumen".to_string()];
        assert_eq!(brand_facets(&brands, &FilterState::default()).len(), 2);
    }

    #[test]
    fn derived_facets_are_distinct_in_first_seen_order() {
        let products = vec![
            with_brand("SoundWave"),
            with_brand("AudioTech"),
            with_brand("soundwave"),
            with_brand(""),
        ];
        assert_eq!(facets_from_products(&products), vec!["SoundWave", "AudioTech"]);
    }
}
