use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Base URL used when none is configured. It resolves nowhere on purpose.
pub const DEFAULT_BASE_URL: &str = "https://your-api-endpoint.com";

/// Path of the match endpoint, appended to the base URL.
pub const MATCH_PATH: &str = "/api/match";

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Settings for [`MatchClient`](crate::MatchClient).
///
/// # Example
/// ```no_run
/// use client::{ClientConfig, MatchClient};
///
/// let cfg = ClientConfig {
///     base_url: "http://localhost:8000".into(),
///     ..Default::default()
/// };
/// let client = MatchClient::new(cfg).expect("valid config");
/// assert_eq!(client.endpoint(), "http://localhost:8000/api/match");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme + host (+ optional path prefix) of the matching service.
    pub base_url: String,
    /// Whole-request timeout. `None` leaves timing to the transport.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Connect timeout. `None` leaves timing to the transport.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// `User-Agent` sent with both the image fetch and the upload.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Largest image a URL query may download. Unlimited when unset.
    #[serde(default)]
    pub max_image_bytes: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
            user_agent: default_user_agent(),
            max_image_bytes: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = Some(limit);
        self
    }

    /// Reject a base URL that is blank or not http(s).
    pub fn validate(&self) -> Result<(), ClientError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::InvalidConfig("base_url is empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got '{base}'"
            )));
        }
        for (name, value) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("max_image_bytes", self.max_image_bytes),
        ] {
            if value == Some(0) {
                return Err(ClientError::InvalidConfig(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    /// `{base_url}/api/match`, without doubling a trailing slash.
    pub fn match_endpoint(&self) -> String {
        format!("{}{MATCH_PATH}", self.base_url.trim().trim_end_matches('/'))
    }

    pub fn is_placeholder(&self) -> bool {
        self.base_url.trim().trim_end_matches('/') == DEFAULT_BASE_URL
    }
}

fn default_user_agent() -> String {
    concat!("vpm-client/", env!("CARGO_PKG_VERSION")).to_string()
}
