//! Visual Product Matcher.
//!
//! Find visually similar products from an image. The workspace crates do the
//! work and this crate ties them into one application:
//!
//! - [`capture`] turns a file, a drop or a URL into a [`PendingQuery`],
//! - [`client`] submits it to the matching service ([`MatchService`]),
//! - [`catalog`] holds the result model and the filter projection,
//! - [`app`] is the screen state machine and [`render`] draws it.
//!
//! ```rust,no_run
//! use vpm::{capture_url, App, StubMatcher};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let mut app = App::new();
//! app.submit(capture_url("https://example.com/shoe.jpg")?, &StubMatcher::default())
//!     .await?;
//! println!("{}", vpm::render::render(&app));
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod render;

pub use crate::app::{App, AppError, QuerySlot, Screen};
pub use crate::config::{AppConfig, AppConfigError, LogFormat};

pub use capture::{
    capture_drop, capture_file, capture_url, CaptureConfig, CaptureError, DragEvent, LocalImage,
    PendingQuery, QueryKind, QueryPayload, UploadCapture, UploadMethod, UploadSink,
};
pub use catalog::{
    diagnose_empty, project, BrandFacet, EmptyCause, FilterState, ImageMetadata, MatchOutcome,
    Product, QuickFilter,
};
pub use client::{ClientConfig, ClientError, MatchClient, MatchService, StubMatcher};

// Crate re-exports for callers that need the full APIs.
pub use capture;
pub use catalog;
pub use client;
