use std::time::{Duration, Instant};

use async_trait::async_trait;
use capture::{ImageFile, PendingQuery, QueryPayload};
use catalog::{MatchOutcome, MatchResponse};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use crate::config::IMAGE_FIELD;
use crate::{ClientConfig, ClientError, MatchService};

/// Content type sent when a fetched image does not declare one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// File name sent for images fetched from a URL without a usable path segment.
const FALLBACK_FILE_NAME: &str = "blob";

/// HTTP implementation of [`MatchService`].
///
/// One submission is at most two requests: a GET for URL queries, then the
/// multipart POST. Neither is retried.
#[derive(Debug, Clone)]
pub struct MatchClient {
    http: reqwest::Client,
    config: ClientConfig,
    endpoint: String,
}

impl MatchClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        if config.is_placeholder() {
            tracing::warn!(
                base_url = %config.base_url,
                "matching service URL is the placeholder; set VPM_BACKEND_URL"
            );
        }

        let endpoint = config.match_endpoint();
        Ok(Self {
            http,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Full URL of the match endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve the query to image bytes, upload them, and decode the answer.
    pub async fn submit_query(&self, query: &PendingQuery) -> Result<MatchOutcome, ClientError> {
        let started = Instant::now();
        let image = match query.payload() {
            QueryPayload::File(file) => file.clone(),
            QueryPayload::Url(url) => self.fetch_image(url).await?,
        };

        let response = self.upload(image).await?;
        let outcome = response.into_outcome()?;

        tracing::info!(
            products = outcome.products.len(),
            brands = outcome.brand_facets.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "match completed"
        );
        Ok(outcome)
    }

    /// Download the image behind a URL query.
    pub async fn fetch_image(&self, url: &str) -> Result<ImageFile, ClientError> {
        let fetch_err = |reason: String| ClientError::ImageFetch {
            url: url.to_string(),
            reason,
        };

        let parsed = reqwest::Url::parse(url).map_err(|e| fetch_err(e.to_string()))?;
        tracing::debug!(%url, "fetching query image");

        let response = self
            .http
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        if let Some(limit) = self.config.max_image_bytes {
            if bytes.len() as u64 > limit {
                return Err(fetch_err(format!(
                    "image is {} bytes, limit is {limit}",
                    bytes.len()
                )));
            }
        }

        Ok(ImageFile {
            file_name: file_name_from_url(&parsed),
            content_type,
            bytes,
        })
    }

    async fn upload(&self, image: ImageFile) -> Result<MatchResponse, ClientError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            file_name = %image.file_name,
            content_type = %image.content_type,
            bytes = image.bytes.len(),
            "uploading image"
        );
        let form = build_form(image)?;

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        serde_json::from_slice::<MatchResponse>(&body)
            .map_err(|e| ClientError::Decode(format!("invalid JSON response: {e}")))
    }
}

#[async_trait]
impl MatchService for MatchClient {
    async fn submit_query(&self, query: &PendingQuery) -> Result<MatchOutcome, ClientError> {
        MatchClient::submit_query(self, query).await
    }
}

/// Multipart body with the image under the `image` field.
///
/// A declared type that does not parse as a MIME type is replaced by
/// `application/octet-stream`; the service decides whether to accept it.
pub(crate) fn build_form(image: ImageFile) -> Result<Form, ClientError> {
    let content_type = if image.content_type.parse::<mime::Mime>().is_ok() {
        image.content_type
    } else {
        tracing::debug!(declared = %image.content_type, "unparseable content type");
        FALLBACK_CONTENT_TYPE.to_string()
    };

    let part = Part::bytes(image.bytes.to_vec())
        .file_name(image.file_name)
        .mime_str(&content_type)
        .map_err(|e| ClientError::Transport(format!("could not build upload body: {e}")))?;
    Ok(Form::new().part(IMAGE_FIELD, part))
}

/// Last non-empty path segment of `url`, or `"blob"`.
fn file_name_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}
