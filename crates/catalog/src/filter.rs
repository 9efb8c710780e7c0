//! Client-side filtering of a result set.
//!
//! [`FilterState`] holds the view parameters a user adjusts after a match has
//! come back: free text, a similarity threshold in percent, and a set of
//! selected brands. [`project`] is the pure function from
//! `(products, filters)` to the visible subset. Nothing is cached; the visible
//! set is recomputed on every call and keeps the service's ranking order.
//!
//! ```rust
//! use catalog::{project, FilterState, Product};
//!
//! let products = vec![
//!     Product { name: "Headphones".into(), similarity: 0.95, ..Default::default() },
//!     Product { name: "Speaker".into(), similarity: 0.60, ..Default::default() },
//! ];
//!
//! let filters = FilterState::default(); // threshold 70
//! let visible = project(&products, &filters);
//! assert_eq!(visible.len(), 1);
//! assert_eq!(visible[0].name, "Headphones");
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::facets::normalize_brand;
use crate::types::Product;

/// Threshold applied on a fresh result set and restored by [`FilterState::reset`].
pub const DEFAULT_THRESHOLD_PERCENT: u8 = 70;

/// Upper bound of the similarity slider.
pub const MAX_THRESHOLD_PERCENT: u8 = 100;

/// User-adjustable view parameters over a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    search_text: String,
    similarity_threshold_percent: u8,
    /// Lower-cased brand names.
    selected_brands: BTreeSet<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            similarity_threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            selected_brands: BTreeSet::new(),
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.set_search_text(text);
        self
    }

    pub fn with_threshold(mut self, percent: u8) -> Self {
        self.set_threshold(percent);
        self
    }

    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for brand in brands {
            self.select_brand(brand.as_ref());
        }
        self
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn threshold_percent(&self) -> u8 {
        self.similarity_threshold_percent
    }

    pub fn selected_brands(&self) -> &BTreeSet<String> {
        &self.selected_brands
    }

    /// Replace the free-text query. The text is kept verbatim; matching lower-cases it.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Set the threshold, clamped to `0..=100`.
    pub fn set_threshold(&mut self, percent: u8) {
        self.similarity_threshold_percent = percent.min(MAX_THRESHOLD_PERCENT);
    }

    pub fn apply_quick_filter(&mut self, quick: QuickFilter) {
        self.similarity_threshold_percent = quick.threshold_percent();
    }

    pub fn select_brand(&mut self, brand: &str) {
        self.selected_brands.insert(normalize_brand(brand));
    }

    pub fn deselect_brand(&mut self, brand: &str) {
        self.selected_brands.remove(&normalize_brand(brand));
    }

    /// Flip the selection of `brand`; returns whether it is selected afterwards.
    pub fn toggle_brand(&mut self, brand: &str) -> bool {
        let key = normalize_brand(brand);
        if self.selected_brands.remove(&key) {
            false
        } else {
            self.selected_brands.insert(key);
            true
        }
    }

    pub fn is_brand_selected(&self, brand: &str) -> bool {
        self.selected_brands.contains(&normalize_brand(brand))
    }

    /// Restore the threshold to 70 and clear selected brands. Search text is untouched.
    pub fn reset(&mut self) {
        self.similarity_threshold_percent = DEFAULT_THRESHOLD_PERCENT;
        self.selected_brands.clear();
    }

    /// Constraints that can currently remove products from the view.
    pub fn active_constraints(&self) -> Vec<Constraint> {
        let mut active = Vec::with_capacity(3);
        if !self.search_text.is_empty() {
            active.push(Constraint::SearchText);
        }
        if self.similarity_threshold_percent > 0 {
            active.push(Constraint::Threshold);
        }
        if !self.selected_brands.is_empty() {
            active.push(Constraint::Brands);
        }
        active
    }
}

/// Preset thresholds offered next to the similarity slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickFilter {
    High,
    Medium,
    All,
}

impl QuickFilter {
    pub const ALL: [QuickFilter; 3] = [QuickFilter::High, QuickFilter::Medium, QuickFilter::All];

    pub fn threshold_percent(self) -> u8 {
        match self {
            QuickFilter::High => 85,
            QuickFilter::Medium => 60,
            QuickFilter::All => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuickFilter::High => "High Match",
            QuickFilter::Medium => "Medium Match",
            QuickFilter::All => "All Results",
        }
    }
}

impl fmt::Display for QuickFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QuickFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(QuickFilter::High),
            "medium" => Ok(QuickFilter::Medium),
            "all" => Ok(QuickFilter::All),
            other => Err(format!(
                "unknown quick filter '{other}' (expected high, medium or all)"
            )),
        }
    }
}

/// One of the three predicates a product must satisfy to be visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    SearchText,
    Threshold,
    Brands,
}

/// Case-insensitive substring match against name, brand, category or any tag.
pub fn matches_text(product: &Product, search_text: &str) -> bool {
    if search_text.is_empty() {
        return true;
    }
    let needle = search_text.to_lowercase();
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    hit(&product.name)
        || hit(&product.brand)
        || hit(&product.category)
        || product.tags.iter().any(|tag| hit(tag))
}

/// `similarity * 100 >= threshold`, with the fraction scaled exactly as stored.
pub fn matches_similarity(product: &Product, threshold_percent: u8) -> bool {
    product.similarity * 100.0 >= f64::from(threshold_percent)
}

/// Empty selection admits every product; otherwise the lower-cased brand must be selected.
pub fn matches_brand(product: &Product, selected_brands: &BTreeSet<String>) -> bool {
    selected_brands.is_empty() || selected_brands.contains(&normalize_brand(&product.brand))
}

/// Whether `product` passes every active filter.
pub fn matches(product: &Product, filters: &FilterState) -> bool {
    matches_text(product, &filters.search_text)
        && matches_similarity(product, filters.similarity_threshold_percent)
        && matches_brand(product, &filters.selected_brands)
}

/// The visible subset of `products`, in input order.
pub fn project<'a>(products: &'a [Product], filters: &FilterState) -> Vec<&'a Product> {
    let visible: Vec<&Product> = products.iter().filter(|p| matches(p, filters)).collect();
    tracing::trace!(
        total = products.len(),
        visible = visible.len(),
        threshold = filters.similarity_threshold_percent,
        "projected result set"
    );
    visible
}

/// Why a projection came out empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmptyCause {
    /// The service returned no products at all.
    NoProducts,
    /// Products exist but the listed constraints hide all of them. When no
    /// single constraint excludes everything, every active constraint is listed.
    Filtered { constraints: Vec<Constraint> },
}

/// Explain an empty projection, or `None` when something is visible.
pub fn diagnose_empty(products: &[Product], filters: &FilterState) -> Option<EmptyCause> {
    if products.is_empty() {
        return Some(EmptyCause::NoProducts);
    }
    if products.iter().any(|p| matches(p, filters)) {
        return None;
    }

    let active = filters.active_constraints();
    let excludes_all = |constraint: &Constraint| {
        !products.iter().any(|p| match constraint {
            Constraint::SearchText => matches_text(p, &filters.search_text),
            Constraint::Threshold => matches_similarity(p, filters.similarity_threshold_percent),
            Constraint::Brands => matches_brand(p, &filters.selected_brands),
        })
    };

    let blocking: Vec<Constraint> = active.iter().copied().filter(excludes_all).collect();
    let constraints = if blocking.is_empty() { active } else { blocking };
    Some(EmptyCause::Filtered { constraints })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, brand: &str, category: &str, similarity: f64) -> Product {
        Product {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.into(),
            brand: brand.into(),
            category: category.into(),
            similarity,
            ..Product::default()
        }
    }

    fn catalogue() -> Vec<Product> {
        vec![
            product("Modern Wireless Headphones", "AudioTech", "Electronics", 0.95),
            product("Premium Bluetooth Speaker", "SoundWave", "Electronics", 0.87),
            Product {
                tags: vec!["retro".into(), "Vintage".into()],
                ..product("Radio Speaker", "RetroSound", "Home", 0.65)
            },
        ]
    }

    #[test]
    fn threshold_seventy_keeps_only_high_scores() {
        let products = vec![
            product("A", "x", "c", 0.95),
            product("B", "x", "c", 0.60),
        ];
        let visible = project(&products, &FilterState::default());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "A");
    }

    #[test]
    fn similarity_predicate_matches_scaled_comparison_for_all_thresholds() {
        let scores = [0.0, 0.01, 0.29, 0.5, 0.555, 0.69, 0.7, 0.701, 0.99, 1.0];
        for threshold in 0..=100u8 {
            for score in scores {
                let p = product("p", "b", "c", score);
                assert_eq!(
                    matches_similarity(&p, threshold),
                    score * 100.0 >= f64::from(threshold),
                    "threshold {threshold} score {score}"
                );
            }
        }
    }

    #[test]
    fn neutral_filters_return_everything_in_order() {
        let products = catalogue();
        let filters = FilterState::default().with_threshold(0);
        let visible = project(&products, &filters);
        let names: Vec<&str> = visible.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Modern Wireless Headphones",
                "Premium Bluetooth Speaker",
                "Radio Speaker"
            ]
        );
    }

    #[test]
    fn search_text_matches_brand_case_insensitively() {
        let products = vec![
            product("Headphones", "AudioTech", "Electronics", 0.9),
            product("Lamp", "Lumen", "Home", 0.9),
        ];
        let filters = FilterState::default().with_search_text("audio");
        let visible = project(&products, &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].brand, "AudioTech");
    }

    #[test]
    fn search_text_matches_tags_and_category() {
        let products = catalogue();
        let by_tag = FilterState::default().with_threshold(0).with_search_text("VINTAGE");
        assert_eq!(project(&products, &by_tag).len(), 1);

        let by_category = FilterState::default().with_threshold(0).with_search_text("electro");
        assert_eq!(project(&products, &by_category).len(), 2);
    }

    #[test]
    fn brand_selection_is_case_insensitive() {
        let products = catalogue();
        let filters = FilterState::default().with_brands(["soundwave"]);
        let visible = project(&products, &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].brand, "SoundWave");
    }

    #[test]
    fn toggle_brand_flips_selection() {
        let mut filters = FilterState::default();
        assert!(filters.toggle_brand("SoundWave"));
        assert!(filters.is_brand_selected("soundwave"));
        assert!(!filters.toggle_brand("SOUNDWAVE"));
        assert!(filters.selected_brands().is_empty());
    }

    #[test]
    fn select_and_deselect_are_idempotent() {
        let mut filters = FilterState::default();
        filters.select_brand("AudioTech");
        filters.select_brand("audiotech");
        assert_eq!(filters.selected_brands().len(), 1);

        filters.deselect_brand("AUDIOTECH");
        filters.deselect_brand("AudioTech");
        assert!(filters.selected_brands().is_empty());
    }

    #[test]
    fn quick_filters_set_fixed_thresholds() {
        let mut filters = FilterState::default();
        filters.apply_quick_filter(QuickFilter::High);
        assert_eq!(filters.threshold_percent(), 85);
        filters.apply_quick_filter(QuickFilter::Medium);
        assert_eq!(filters.threshold_percent(), 60);
        filters.apply_quick_filter(QuickFilter::All);
        assert_eq!(filters.threshold_percent(), 0);
    }

    #[test]
    fn quick_filter_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<QuickFilter>(), Ok(QuickFilter::High));
        assert_eq!(" medium ".parse::<QuickFilter>(), Ok(QuickFilter::Medium));
        assert!("most".parse::<QuickFilter>().is_err());
    }

    #[test]
    fn reset_is_idempotent_and_keeps_search_text() {
        let mut filters = FilterState::default()
            .with_search_text("speaker")
            .with_threshold(12)
            .with_brands(["AudioTech", "SoundWave"]);

        filters.reset();
        let once = filters.clone();
        filters.reset();

        assert_eq!(filters, once);
        assert_eq!(filters.threshold_percent(), DEFAULT_THRESHOLD_PERCENT);
        assert!(filters.selected_brands().is_empty());
        assert_eq!(filters.search_text(), "speaker");
    }

    #[test]
    fn threshold_is_clamped() {
        let filters = FilterState::default().with_threshold(250);
        assert_eq!(filters.threshold_percent(), 100);
    }

    #[test]
    fn diagnose_reports_no_products() {
        assert_eq!(
            diagnose_empty(&[], &FilterState::default()),
            Some(EmptyCause::NoProducts)
        );
    }

    #[test]
    fn diagnose_is_none_when_something_is_visible() {
        assert_eq!(diagnose_empty(&catalogue(), &FilterState::default()), None);
    }

    #[test]
    fn diagnose_blames_the_search_term() {
        let filters = FilterState::default().with_threshold(0).with_search_text("tractor");
        assert_eq!(
            diagnose_empty(&catalogue(), &filters),
            Some(EmptyCause::Filtered {
                constraints: vec![Constraint::SearchText]
            })
        );
    }

    #[test]
    fn diagnose_blames_the_threshold() {
        let filters = FilterState::default().with_threshold(99);
        assert_eq!(
            diagnose_empty(&catalogue(), &filters),
            Some(EmptyCause::Filtered {
                constraints: vec![Constraint::Threshold]
            })
        );
    }

    #[test]
    fn diagnose_lists_all_active_when_only_the_combination_excludes() {
        // "radio" alone finds RetroSound at 0.65; threshold 70 alone keeps two others.
        let filters = FilterState::default().with_search_text("radio");
        assert_eq!(
            diagnose_empty(&catalogue(), &filters),
            Some(EmptyCause::Filtered {
                constraints: vec![Constraint::SearchText, Constraint::Threshold]
            })
        );
    }
}
