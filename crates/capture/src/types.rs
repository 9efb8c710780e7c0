use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// How the user supplied the query image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    File,
    Url,
}

/// Image bytes read from a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    /// Declared content type, always starting with the accepted prefix.
    pub content_type: String,
    pub bytes: Bytes,
}

/// What gets sent to the matching service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPayload {
    File(ImageFile),
    /// Trimmed, otherwise unvalidated; reachability is checked at fetch time.
    Url(String),
}

/// The user's search input between capture and the match response.
///
/// Created by one user action and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    payload: QueryPayload,
    preview_url: String,
}

impl PendingQuery {
    pub(crate) fn new(payload: QueryPayload, preview_url: String) -> Self {
        Self {
            payload,
            preview_url,
        }
    }

    /// Build a file query from bytes already in memory (clipboard, tests).
    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let file_name = file_name.into();
        let preview_url = format!("memory:///{file_name}");
        Self::new(
            QueryPayload::File(ImageFile {
                file_name,
                content_type: content_type.into(),
                bytes: bytes.into(),
            }),
            preview_url,
        )
    }

    pub fn kind(&self) -> QueryKind {
        match self.payload {
            QueryPayload::File(_) => QueryKind::File,
            QueryPayload::Url(_) => QueryKind::Url,
        }
    }

    pub fn payload(&self) -> &QueryPayload {
        &self.payload
    }

    pub fn into_payload(self) -> QueryPayload {
        self.payload
    }

    /// Location shown as the query image: a `file://` URL for local files,
    /// the URL itself for remote images.
    pub fn preview_url(&self) -> &str {
        &self.preview_url
    }

    /// Short label for logs and headers.
    pub fn describe(&self) -> String {
        match &self.payload {
            QueryPayload::File(file) => format!("{} ({} bytes)", file.file_name, file.bytes.len()),
            QueryPayload::Url(url) => url.clone(),
        }
    }
}

/// A local file offered by a drop event or the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub path: PathBuf,
    /// Type the source declared; guessed from the extension when absent.
    pub declared_type: Option<String>,
}

impl LocalImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declared_type: None,
        }
    }

    pub fn with_declared_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    /// The declared type, or the extension-derived guess.
    pub fn resolved_type(&self) -> Option<String> {
        self.declared_type
            .clone()
            .or_else(|| guess_type(&self.path))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

fn guess_type(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .and_then(|ext| mime_guess::from_ext(&ext).first())
        .map(|mime| mime.to_string())
}
