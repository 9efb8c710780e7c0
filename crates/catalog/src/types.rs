use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP-style status the matching service embeds in a successful response body.
pub const STATUS_OK: i64 = 200;

/// Attributes the matching service extracted from the query image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub category: String,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub color: String,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub material: String,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub brand: String,
    /// Ordered as produced by the extractor.
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub tags: Vec<String>,
}

/// One ranked catalogue entry returned for a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub id: String,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub category: String,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub image_url: String,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub target_audience: String,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub brand: String,
    /// Similarity to the query image as a fraction in `[0, 1]`.
    pub similarity: f64,
}

impl Product {
    /// Similarity scaled to a whole percentage, rounded half away from zero.
    pub fn similarity_percent(&self) -> i64 {
        (self.similarity * 100.0).round() as i64
    }
}

/// `"Image metadata"` object of the wire response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub metadata: ImageMetadata,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub embedding: Vec<f64>,
}

/// `"Result"` object of the wire response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResultSet {
    #[serde(rename = "Content")]
    pub content: Vec<Product>,
    #[serde(
        rename = "Filter_brand",
        default,
        deserialize_with = "crate::serde_nullable::deserialize"
    )]
    pub filter_brand: Vec<String>,
}

/// Body returned by `POST /api/match`.
///
/// Field names mix casing and spacing exactly as the backend emits them.
///
/// ```json
/// {
///   "status_code": 200,
///   "Image metadata": { "metadata": { "brand": "AudioTech" }, "embedding": [0.1] },
///   "Result": { "Content": [], "Filter_brand": ["AudioTech"] },
///   "message": "Image processed and metadata extracted successfully"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResponse {
    pub status_code: i64,
    #[serde(rename = "Image metadata", default, skip_serializing_if = "Option::is_none")]
    pub image_metadata: Option<QueryAnalysis>,
    #[serde(rename = "Result", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MatchResultSet>,
    #[serde(default, deserialize_with = "crate::serde_nullable::deserialize")]
    pub message: String,
}

/// Reasons a decoded [`MatchResponse`] cannot become a [`MatchOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// The body carried a `status_code` other than 200.
    #[error("service reported status {status_code}: {message}")]
    NonOkStatus { status_code: i64, message: String },
    /// A required top-level section was absent.
    #[error("response is missing `{0}`")]
    MissingSection(&'static str),
}

impl MatchResponse {
    /// Convert the wire body into the domain outcome, enforcing the embedded status.
    pub fn into_outcome(self) -> Result<MatchOutcome, ResponseError> {
        if self.status_code != STATUS_OK {
            return Err(ResponseError::NonOkStatus {
                status_code: self.status_code,
                message: self.message,
            });
        }
        let analysis = self
            .image_metadata
            .ok_or(ResponseError::MissingSection("Image metadata"))?;
        let result = self.result.ok_or(ResponseError::MissingSection("Result"))?;

        Ok(MatchOutcome {
            metadata: analysis.metadata,
            embedding: analysis.embedding,
            products: result.content,
            brand_facets: result.filter_brand,
            message: self.message,
        })
    }
}

/// A successful match, destructured for the application layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub metadata: ImageMetadata,
    pub embedding: Vec<f64>,
    /// Ranked as the service returned them.
    pub products: Vec<Product>,
    /// Brand values offered for filtering, passed through as received.
    pub brand_facets: Vec<String>,
    pub message: String,
}

impl MatchOutcome {
    /// Wrap the outcome back into the wire shape, e.g. for serving it from a mock backend.
    pub fn into_response(self) -> MatchResponse {
        MatchResponse {
            status_code: STATUS_OK,
            image_metadata: Some(QueryAnalysis {
                metadata: self.metadata,
                embedding: self.embedding,
            }),
            result: Some(MatchResultSet {
                content: self.products,
                filter_brand: self.brand_facets,
            }),
            message: self.message,
        }
    }
}
