//! Text rendering of the three screens.
//!
//! Every function here is pure: it reads the controller state and returns the
//! text to print. Nothing is cached, so the results header and the grid are
//! always computed from the same projection.

use capture::PendingQuery;
use catalog::{
    brand_facets, diagnose_empty, project, BrandFacet, Constraint, EmptyCause, FilterState,
    ImageMetadata, MatchOutcome, Product, QuickFilter,
};
use serde::Serialize;

use crate::app::{App, Screen};

pub const TITLE: &str = "Visual Product Matcher";

/// Number of placeholder cards shown while a search is running.
pub const SKELETON_CARDS: usize = 6;

/// Tags shown on a card before collapsing the rest into "+N more".
pub const MAX_CARD_TAGS: usize = 3;

/// Shown instead of product or query images that cannot be displayed.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.pexels.com/photos/1649771/pexels-photo-1649771.jpeg?auto=compress&cs=tinysrgb&w=400";

const RULE: &str = "------------------------------------------------------------";

/// Colour band of the similarity badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    High,
    Medium,
    Low,
}

impl MatchTier {
    /// Band for an unrounded percentage, so the badge agrees with the threshold filter.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 90.0 {
            MatchTier::High
        } else if percent >= 70.0 {
            MatchTier::Medium
        } else {
            MatchTier::Low
        }
    }

    pub fn for_product(product: &Product) -> Self {
        Self::from_percent(product.similarity * 100.0)
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchTier::High => "high",
            MatchTier::Medium => "medium",
            MatchTier::Low => "low",
        }
    }
}

/// `url` when it can be shown, otherwise [`PLACEHOLDER_IMAGE_URL`].
pub fn display_image_url(url: &str) -> &str {
    let url = url.trim();
    let showable = ["http://", "https://", "file://", "memory://"]
        .iter()
        .any(|scheme| url.starts_with(scheme) && url.len() > scheme.len());
    if showable {
        url
    } else {
        PLACEHOLDER_IMAGE_URL
    }
}

/// "1 product found", "3 products found".
pub fn results_header(count: usize) -> String {
    let noun = if count == 1 { "product" } else { "products" };
    format!("{count} {noun} found")
}

/// Render whatever screen `app` is on.
pub fn render(app: &App) -> String {
    match app.screen() {
        Screen::Upload { error } => render_upload(error.as_deref()),
        Screen::Loading { query } => render_loading(query),
        Screen::Results {
            query,
            outcome,
            filters,
        } => render_results(query, outcome, filters),
    }
}

pub fn render_upload(error: Option<&str>) -> String {
    let mut lines = vec![
        TITLE.to_string(),
        "Upload an image or provide a URL to find visually similar products".to_string(),
        String::new(),
        "  file <path>   Upload File (JPG, PNG, GIF, WebP)".to_string(),
        "  url <url>     Image URL".to_string(),
    ];
    if let Some(message) = error {
        lines.push(String::new());
        lines.push(format!("! {message}"));
    }
    lines.join("\n")
}

pub fn render_loading(query: &PendingQuery) -> String {
    let mut lines = vec![
        "Processing your image...".to_string(),
        format!("Query: {}", query.describe()),
        format!("Preview: {}", display_image_url(query.preview_url())),
        String::new(),
    ];
    lines.extend((0..SKELETON_CARDS).map(|_| "[ ░░░░░░░░░░░░  ░░░░░░  ░░░ ]".to_string()));
    lines.join("\n")
}

pub fn render_results(query: &PendingQuery, outcome: &MatchOutcome, filters: &FilterState) -> String {
    let visible = project(&outcome.products, filters);

    let mut lines = Vec::new();
    lines.extend(query_panel(query, outcome));
    lines.push(RULE.to_string());
    lines.extend(filter_panel(outcome, filters));
    lines.push(RULE.to_string());

    let mut header = results_header(visible.len());
    if !filters.search_text().is_empty() {
        header.push_str(&format!(" \"{}\"", filters.search_text()));
    }
    header.push_str(&format!("    Similarity >= {}%", filters.threshold_percent()));
    lines.push(header);
    lines.push(String::new());

    if visible.is_empty() {
        if let Some(cause) = diagnose_empty(&outcome.products, filters) {
            lines.extend(empty_state(&cause, filters));
        }
    } else {
        for product in visible {
            lines.push(render_product_card(product));
            lines.push(String::new());
        }
    }
    lines.join("\n").trim_end().to_string()
}

fn query_panel(query: &PendingQuery, outcome: &MatchOutcome) -> Vec<String> {
    let mut lines = vec![
        "Query Image".to_string(),
        format!("  Image:   {}", display_image_url(query.preview_url())),
        "  Status:  Analyzed".to_string(),
        format!("  Matches: {} found", outcome.products.len()),
    ];
    lines.extend(metadata_lines(&outcome.metadata));
    lines
}

fn metadata_lines(metadata: &ImageMetadata) -> Vec<String> {
    let fields = [
        ("Category", metadata.category.as_str()),
        ("Color", metadata.color.as_str()),
        ("Material", metadata.material.as_str()),
        ("Brand", metadata.brand.as_str()),
    ];
    let mut lines: Vec<String> = fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("  {label}: {value}"))
        .collect();
    if !metadata.tags.is_empty() {
        lines.push(format!("  Tags: {}", metadata.tags.join(", ")));
    }
    lines
}

fn filter_panel(outcome: &MatchOutcome, filters: &FilterState) -> Vec<String> {
    let quick = QuickFilter::ALL
        .iter()
        .map(|q| {
            let mark = if q.threshold_percent() == filters.threshold_percent() {
                "*"
            } else {
                " "
            };
            format!("[{mark}] {} ({}%+)", q.label(), q.threshold_percent())
        })
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = vec![
        "Filters".to_string(),
        format!("  Similarity threshold: {}%", filters.threshold_percent()),
        format!("  Quick filters: {quick}"),
    ];
    let facets = brand_facets(&outcome.brand_facets, filters);
    if !facets.is_empty() {
        lines.push("  Brands:".to_string());
        lines.extend(facets.iter().map(facet_line));
    }
    lines
}

fn facet_line(facet: &BrandFacet) -> String {
    let mark = if facet.selected { "x" } else { " " };
    format!("    [{mark}] {}", facet.label)
}

fn empty_state(cause: &EmptyCause, filters: &FilterState) -> Vec<String> {
    let mut lines = vec!["No matches found".to_string()];
    match cause {
        EmptyCause::NoProducts => {
            lines.push("The service returned no similar products for this image.".to_string());
        }
        EmptyCause::Filtered { constraints } => {
            lines.push(
                "Try lowering the similarity threshold or adjusting your search terms.".to_string(),
            );
            for constraint in constraints {
                lines.push(match constraint {
                    Constraint::Threshold => {
                        format!("  Current threshold: {}%", filters.threshold_percent())
                    }
                    Constraint::SearchText => format!("  Searching: \"{}\"", filters.search_text()),
                    Constraint::Brands => format!(
                        "  Brands: {}",
                        filters
                            .selected_brands()
                            .iter()
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                });
            }
        }
    }
    lines
}

/// One product card: badge, name, brand, category, audience, tags and image.
pub fn render_product_card(product: &Product) -> String {
    let percent = product.similarity_percent();
    let tier = MatchTier::for_product(product);

    let mut lines = vec![
        format!("{percent}% match [{}]  {}", tier.label(), product.name),
        format!("  {}", product.brand),
        format!("  {} | {}", product.category, product.target_audience),
    ];
    if !product.tags.is_empty() {
        let mut tags: Vec<String> = product
            .tags
            .iter()
            .take(MAX_CARD_TAGS)
            .map(|t| format!("#{t}"))
            .collect();
        if product.tags.len() > MAX_CARD_TAGS {
            tags.push(format!("+{} more", product.tags.len() - MAX_CARD_TAGS));
        }
        lines.push(format!("  {}", tags.join(" ")));
    }
    lines.push(format!("  {percent}% similarity"));
    lines.push(format!("  {}", display_image_url(&product.image_url)));
    lines.join("\n")
}

/// Machine-readable snapshot of the results screen.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsView<'a> {
    pub source: String,
    pub metadata: &'a ImageMetadata,
    pub total: usize,
    pub visible_count: usize,
    pub filters: &'a FilterState,
    pub brands: Vec<BrandFacet>,
    pub products: Vec<&'a Product>,
}

pub fn results_view(app: &App) -> Option<ResultsView<'_>> {
    match app.screen() {
        Screen::Results {
            query,
            outcome,
            filters,
        } => {
            let products = project(&outcome.products, filters);
            Some(ResultsView {
                source: query.describe(),
                metadata: &outcome.metadata,
                total: outcome.products.len(),
                visible_count: products.len(),
                filters,
                brands: brand_facets(&outcome.brand_facets, filters),
                products,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, brand: &str, similarity: f64, tags: &[&str]) -> Product {
        Product {
            id: name.into(),
            name: name.into(),
            brand: brand.into(),
            category: "Electronics".into(),
            target_audience: "Adults".into(),
            image_url: format!("https://cdn.example.com/{name}.jpg"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            similarity,
        }
    }

    fn results_app(products: Vec<Product>) -> App {
        let brands = catalog::facets_from_products(&products);
        let mut app = App::new();
        app.begin(PendingQuery::from_bytes("q.png", "image/png", vec![1u8]))
            .unwrap();
        app.finish(Ok(MatchOutcome {
            products,
            brand_facets: brands,
            ..MatchOutcome::default()
        }))
        .unwrap();
        app
    }

    #[test]
    fn tiers_follow_badge_bands() {
        assert_eq!(MatchTier::from_percent(95.0), MatchTier::High);
        assert_eq!(MatchTier::from_percent(90.0), MatchTier::High);
        assert_eq!(MatchTier::from_percent(89.9), MatchTier::Medium);
        assert_eq!(MatchTier::from_percent(70.0), MatchTier::Medium);
        assert_eq!(MatchTier::from_percent(69.99), MatchTier::Low);
    }

    #[test]
    fn badge_tier_uses_unrounded_score() {
        let near_high = product("P", "AudioTech", 0.895, &[]);
        assert_eq!(MatchTier::for_product(&near_high), MatchTier::Medium);
        assert!(render_product_card(&near_high).starts_with("90% match [medium]  P"));

        let near_medium = product("Q", "AudioTech", 0.695, &[]);
        assert_eq!(MatchTier::for_product(&near_medium), MatchTier::Low);
        assert!(render_product_card(&near_medium).starts_with("70% match [low]  Q"));
        assert!(!catalog::matches_similarity(&near_medium, 70));
    }

    #[test]
    fn unusable_image_urls_fall_back() {
        assert_eq!(display_image_url(""), PLACEHOLDER_IMAGE_URL);
        assert_eq!(display_image_url("   "), PLACEHOLDER_IMAGE_URL);
        assert_eq!(display_image_url("ftp://x/y.png"), PLACEHOLDER_IMAGE_URL);
        assert_eq!(display_image_url("https://"), PLACEHOLDER_IMAGE_URL);
        assert_eq!(display_image_url("https://a.com/b.jpg"), "https://a.com/b.jpg");
        assert_eq!(display_image_url("file:///tmp/q.png"), "file:///tmp/q.png");
    }

    #[test]
    fn header_pluralizes() {
        assert_eq!(results_header(0), "0 products found");
        assert_eq!(results_header(1), "1 product found");
        assert_eq!(results_header(6), "6 products found");
    }

    #[test]
    fn card_shows_three_tags_and_overflow() {
        let card = render_product_card(&product(
            "Headphones",
            "AudioTech",
            0.954,
            &["a", "b", "c", "d", "e"],
        ));
        assert!(card.starts_with("95% match [high]  Headphones"));
        assert!(card.contains("#a #b #c +2 more"));
        assert!(!card.contains("#d"));
    }

    #[test]
    fn loading_shows_skeletons() {
        let text = render_loading(&PendingQuery::from_bytes("q.png", "image/png", vec![1u8]));
        assert_eq!(text.matches("[ ░").count(), SKELETON_CARDS);
        assert!(text.contains("memory:///q.png"));
    }

    #[test]
    fn upload_shows_error() {
        let text = render_upload(Some("Failed to process image. Please try again."));
        assert!(text.starts_with(TITLE));
        assert!(text.contains("! Failed to process image."));
        assert!(!render_upload(None).contains('!'));
    }

    #[test]
    fn header_counts_visible_products() {
        let app = results_app(vec![
            product("Headphones", "AudioTech", 0.95, &[]),
            product("Radio", "RetroSound", 0.60, &[]),
        ]);
        let text = render(&app);
        assert!(text.contains("Matches: 2 found"));
        assert!(text.contains("1 product found"));
        assert!(text.contains("Headphones"));
        assert!(!text.contains("% match [low]  Radio"));
        assert!(text.contains("[ ] AudioTech"));
    }

    #[test]
    fn empty_state_names_the_cause() {
        let mut app = results_app(vec![product("Radio", "RetroSound", 0.60, &[])]);
        let text = render(&app);
        assert!(text.contains("No matches found"));
        assert!(text.contains("Current threshold: 70%"));

        app.apply_quick_filter(QuickFilter::All).unwrap();
        app.set_search_text("laptop").unwrap();
        let text = render(&app);
        assert!(text.contains("Searching: \"laptop\""));
        assert!(!text.contains("Current threshold"));

        let empty = results_app(Vec::new());
        assert!(render(&empty).contains("returned no similar products"));
    }

    #[test]
    fn selected_facets_are_marked() {
        let mut app = results_app(vec![
            product("Headphones", "AudioTech", 0.95, &[]),
            product("Speaker", "SoundWave", 0.87, &[]),
        ]);
        app.toggle_brand("SoundWave").unwrap();
        let text = render(&app);
        assert!(text.contains("[x] SoundWave"));
        assert!(text.contains("[ ] AudioTech"));
        assert!(text.contains("1 product found"));
    }

    #[test]
    fn results_view_matches_projection() {
        let app = results_app(vec![
            product("Headphones", "AudioTech", 0.95, &[]),
            product("Radio", "RetroSound", 0.60, &[]),
        ]);
        let view = results_view(&app).unwrap();
        assert_eq!(view.total, 2);
        assert_eq!(view.visible_count, 1);
        assert_eq!(view.products.len(), 1);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["products"][0]["brand"], "AudioTech");
        assert!(results_view(&App::new()).is_none());
    }
}
