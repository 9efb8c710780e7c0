//! Configuration for upload capture.

use serde::{Deserialize, Serialize};

/// Declared-type prefix a local file must carry to be accepted.
pub const IMAGE_TYPE_PREFIX: &str = "image/";

/// Runtime limits applied while turning user input into a [`PendingQuery`](crate::PendingQuery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Prefix the declared content type must start with.
    #[serde(default = "default_type_prefix")]
    pub accepted_type_prefix: String,
    /// Largest local file accepted, in bytes. `None` means unlimited.
    #[serde(default)]
    pub max_file_bytes: Option<u64>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            accepted_type_prefix: default_type_prefix(),
            max_file_bytes: None,
        }
    }
}

impl CaptureConfig {
    pub fn with_max_file_bytes(mut self, limit: u64) -> Self {
        self.max_file_bytes = Some(limit);
        self
    }

    /// Whether a declared content type is acceptable.
    pub fn accepts_type(&self, declared_type: &str) -> bool {
        declared_type.starts_with(&self.accepted_type_prefix)
    }
}

fn default_type_prefix() -> String {
    IMAGE_TYPE_PREFIX.to_string()
}
