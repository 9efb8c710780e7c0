use std::time::Duration;

use async_trait::async_trait;
use capture::{PendingQuery, QueryPayload};
use catalog::{facets_from_products, ImageMetadata, MatchOutcome, Product};
use fxhash::hash64;

use crate::{ClientError, MatchService};

/// Dimension of the stub embedding.
const STUB_EMBEDDING_DIM: usize = 16;

/// Offline [`MatchService`] answering every query with a fixed demo catalogue.
///
/// The embedding is derived from a hash of the query bytes (or URL) so the
/// same input always yields the same vector. Useful for demos and tests
/// without a running backend.
#[derive(Debug, Clone)]
pub struct StubMatcher {
    products: Vec<Product>,
    metadata: ImageMetadata,
    latency: Option<Duration>,
    failure: Option<ClientError>,
}

impl Default for StubMatcher {
    fn default() -> Self {
        Self::new(demo_catalogue())
    }
}

impl StubMatcher {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            metadata: demo_metadata(),
            latency: None,
            failure: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ImageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Sleep this long before answering, to make the loading screen visible.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer every query with `err` instead of the catalogue.
    pub fn failing_with(mut self, err: ClientError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

#[async_trait]
impl MatchService for StubMatcher {
    async fn submit_query(&self, query: &PendingQuery) -> Result<MatchOutcome, ClientError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        tracing::debug!(source = %query.describe(), "answering from stub catalogue");
        Ok(MatchOutcome {
            metadata: self.metadata.clone(),
            embedding: stub_embedding(query),
            products: self.products.clone(),
            brand_facets: facets_from_products(&self.products),
            message: "Image processed and metadata extracted successfully".into(),
        })
    }
}

fn stub_embedding(query: &PendingQuery) -> Vec<f64> {
    let h = match query.payload() {
        QueryPayload::File(file) => hash64(file.bytes.as_ref()),
        QueryPayload::Url(url) => hash64(url.as_bytes()),
    };
    (0..STUB_EMBEDDING_DIM)
        .map(|idx| ((h >> (idx % 32)) as f64 * 0.0001).sin())
        .collect()
}

fn demo_metadata() -> ImageMetadata {
    ImageMetadata {
        category: "Electronics".into(),
        color: "Black".into(),
        material: "Plastic".into(),
        brand: "AudioTech".into(),
        tags: vec!["headphones".into(), "wireless".into(), "audio".into()],
    }
}

fn demo_product(
    id: &str,
    name: &str,
    photo: u32,
    similarity: f64,
    brand: &str,
    category: &str,
    tags: &[&str],
) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        category: category.into(),
        image_url: format!(
            "https://images.pexels.com/photos/{photo}/pexels-photo-{photo}.jpeg?auto=compress&cs=tinysrgb&w=400"
        ),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        target_audience: "Adults".into(),
        brand: brand.into(),
        similarity,
    }
}

/// The six-product catalogue shown in demo mode, ranked by similarity.
pub fn demo_catalogue() -> Vec<Product> {
    vec![
        demo_product(
            "1",
            "Modern Wireless Headphones",
            3587478,
            0.95,
            "AudioTech",
            "Electronics",
            &["headphones", "wireless", "over-ear", "bluetooth"],
        ),
        demo_product(
            "2",
            "Premium Bluetooth Speaker",
            1649771,
            0.87,
            "SoundWave",
            "Electronics",
            &["speaker", "bluetooth"],
        ),
        demo_product(
            "3",
            "Studio Monitor Speakers",
            164854,
            0.82,
            "ProAudio",
            "Electronics",
            &["speaker", "studio"],
        ),
        demo_product(
            "4",
            "Noise Canceling Earbuds",
            1649771,
            0.78,
            "TechSound",
            "Electronics",
            &["earbuds", "noise-canceling"],
        ),
        demo_product(
            "5",
            "Gaming Headset Pro",
            3394650,
            0.75,
            "GameAudio",
            "Gaming",
            &["headset", "microphone"],
        ),
        demo_product(
            "6",
            "Vintage Radio Speaker",
            1841841,
            0.65,
            "RetroSound",
            "Vintage",
            &["radio", "retro"],
        ),
    ]
}
