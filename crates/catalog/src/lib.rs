//! # VPM Catalog (`catalog`)
//!
//! Data model for the Visual Product Matcher client and the pure projection
//! that turns a fetched result set into what the user sees.
//!
//! - [`MatchResponse`] is the wire body of `POST /api/match`, with the
//!   backend's field names kept verbatim (`"Image metadata"`, `Result`,
//!   `Content`, `Filter_brand`).
//! - [`MatchOutcome`] is the destructured success value handed to the UI.
//! - [`FilterState`] and [`project`] implement text, similarity-threshold and
//!   brand filtering without touching the network.
//!
//! ```rust
//! use catalog::{project, FilterState, MatchResponse};
//!
//! let body = r#"{
//!     "status_code": 200,
//!     "Image metadata": {"metadata": {"brand": "SoundWave"}, "embedding": []},
//!     "Result": {
//!         "Content": [{"id": "2", "name": "Speaker", "brand": "SoundWave", "similarity": 0.87}],
//!         "Filter_brand": ["SoundWave"]
//!     },
//!     "message": "ok"
//! }"#;
//!
//! let outcome = serde_json::from_str::<MatchResponse>(body)?.into_outcome()?;
//! let filters = FilterState::default().with_brands(["soundwave"]);
//! assert_eq!(project(&outcome.products, &filters).len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod facets;
pub mod filter;
pub mod types;

mod serde_nullable;

pub use facets::{brand_facets, facets_from_products, normalize_brand, BrandFacet};
pub use filter::{
    diagnose_empty, matches, matches_brand, matches_similarity, matches_text, project,
    Constraint, EmptyCause, FilterState, QuickFilter, DEFAULT_THRESHOLD_PERCENT,
    MAX_THRESHOLD_PERCENT,
};
pub use types::{
    ImageMetadata, MatchOutcome, MatchResponse, MatchResultSet, Product, QueryAnalysis,
    ResponseError, STATUS_OK,
};
