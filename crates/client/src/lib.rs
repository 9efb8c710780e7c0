//! # VPM Client (`client`)
//!
//! Talks to the matching service. A [`PendingQuery`] becomes one multipart
//! `POST {base_url}/api/match` with the image under the `image` field; URL
//! queries are downloaded first and uploaded the same way.
//!
//! The answer is decoded into a [`MatchOutcome`]. Anything else (network
//! failure, non-2xx status, `status_code != 200`, malformed body) is a
//! [`ClientError`]. Callers show [`ClientError::user_message`] and log the
//! typed variant.
//!
//! [`MatchService`] is the seam the application depends on. [`MatchClient`]
//! implements it over HTTP and [`StubMatcher`] answers offline with a fixed
//! catalogue.

use async_trait::async_trait;
use capture::PendingQuery;
use catalog::MatchOutcome;

mod api;
pub mod config;
pub mod error;
pub mod stub;

pub use api::MatchClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, IMAGE_FIELD, MATCH_PATH};
pub use error::{ClientError, ErrorCategory, USER_FACING_MESSAGE};
pub use stub::{demo_catalogue, StubMatcher};

/// Something that can answer a query with matching products.
#[async_trait]
pub trait MatchService: Send + Sync {
    /// Submit one query. No retries; a failure is final for this submission.
    async fn submit_query(&self, query: &PendingQuery) -> Result<MatchOutcome, ClientError>;
}

#[async_trait]
impl<T: MatchService + ?Sized> MatchService for std::sync::Arc<T> {
    async fn submit_query(&self, query: &PendingQuery) -> Result<MatchOutcome, ClientError> {
        (**self).submit_query(query).await
    }
}
