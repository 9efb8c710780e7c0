//! # VPM Capture (`capture`)
//!
//! Turns a user action into exactly one [`PendingQuery`]:
//!
//! - a file chosen in the picker ([`capture_file`]),
//! - files dropped on the drop zone ([`capture_drop`], first item only),
//! - a URL typed into the URL box ([`capture_url`]).
//!
//! Local files must declare a type starting with `image/` (guessed from the
//! extension when the source does not declare one). URLs are only checked for
//! being non-blank; a malformed URL fails later, when the client fetches it.
//!
//! [`UploadCapture`] wraps these in the stateful upload control (method
//! selector, drag highlight, URL input, disabled-while-loading) and forwards
//! each accepted query to an [`UploadSink`] once.
//!
//! ```rust
//! use capture::{capture_url, QueryKind, QueryPayload};
//!
//! let query = capture_url("  https://images.example.com/shoe.jpg ")?;
//! assert_eq!(query.kind(), QueryKind::Url);
//! assert_eq!(query.preview_url(), "https://images.example.com/shoe.jpg");
//! assert!(matches!(query.payload(), QueryPayload::Url(u) if u.ends_with("shoe.jpg")));
//! # Ok::<(), capture::CaptureError>(())
//! ```

use std::path::Path;

use bytes::Bytes;

pub mod config;
pub mod control;
pub mod error;
pub mod types;

pub use config::{CaptureConfig, IMAGE_TYPE_PREFIX};
pub use control::{DragEvent, UploadCapture, UploadMethod, UploadSink};
pub use error::CaptureError;
pub use types::{ImageFile, LocalImage, PendingQuery, QueryKind, QueryPayload};

/// Accept a URL typed by the user. The trimmed string is payload and preview.
pub fn capture_url(input: &str) -> Result<PendingQuery, CaptureError> {
    let url = input.trim();
    if url.is_empty() {
        return Err(CaptureError::EmptyUrl);
    }
    Ok(PendingQuery::new(
        QueryPayload::Url(url.to_string()),
        url.to_string(),
    ))
}

/// Accept a file chosen in the file picker.
pub fn capture_file(path: &Path, cfg: &CaptureConfig) -> Result<PendingQuery, CaptureError> {
    capture_local(&LocalImage::new(path), cfg)
}

/// Accept a drop event. Only the first item is considered; the rest are ignored.
pub fn capture_drop(items: &[LocalImage], cfg: &CaptureConfig) -> Result<PendingQuery, CaptureError> {
    let first = items.first().ok_or(CaptureError::NothingDropped)?;
    if items.len() > 1 {
        tracing::debug!(ignored = items.len() - 1, "multiple files dropped, using the first");
    }
    capture_local(first, cfg)
}

fn capture_local(image: &LocalImage, cfg: &CaptureConfig) -> Result<PendingQuery, CaptureError> {
    let file_name = image.file_name();
    let declared_type = image.resolved_type().unwrap_or_default();
    if !cfg.accepts_type(&declared_type) {
        return Err(CaptureError::NotAnImage {
            file_name,
            declared_type: if declared_type.is_empty() {
                "unknown".to_string()
            } else {
                declared_type
            },
        });
    }

    let io_err = |e: std::io::Error| CaptureError::Io {
        path: image.path.display().to_string(),
        message: e.to_string(),
    };

    let size = std::fs::metadata(&image.path).map_err(io_err)?.len();
    if let Some(limit) = cfg.max_file_bytes {
        if size > limit {
            return Err(CaptureError::TooLarge {
                file_name,
                size,
                limit,
            });
        }
    }

    let bytes = std::fs::read(&image.path).map_err(io_err)?;
    if bytes.is_empty() {
        return Err(CaptureError::EmptyFile(file_name));
    }

    let preview_url = preview_for_path(&image.path);
    Ok(PendingQuery::new(
        QueryPayload::File(ImageFile {
            file_name,
            content_type: declared_type,
            bytes: Bytes::from(bytes),
        }),
        preview_url,
    ))
}

fn preview_for_path(path: &Path) -> String {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents)
            .unwrap();
        path
    }

    #[test]
    fn url_is_trimmed() {
        let query = capture_url("\thttps://example.com/bag.webp  ").unwrap();
        assert_eq!(
            query.payload(),
            &QueryPayload::Url("https://example.com/bag.webp".into())
        );
    }

    #[test]
    fn blank_url_is_rejected() {
        assert_eq!(capture_url("   ").unwrap_err(), CaptureError::EmptyUrl);
        assert_eq!(capture_url("").unwrap_err(), CaptureError::EmptyUrl);
    }

    #[test]
    fn malformed_url_is_still_accepted() {
        let query = capture_url("not a url").unwrap();
        assert_eq!(query.kind(), QueryKind::Url);
    }

    #[test]
    fn image_file_is_read_with_type_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "lamp.jpg", b"\xff\xd8\xff");

        let query = capture_file(&path, &CaptureConfig::default()).unwrap();
        match query.payload() {
            QueryPayload::File(file) => {
                assert_eq!(file.file_name, "lamp.jpg");
                assert_eq!(file.content_type, "image/jpeg");
                assert_eq!(file.bytes.as_ref(), b"\xff\xd8\xff");
            }
            other => panic!("expected file payload, got {other:?}"),
        }
        assert!(query.preview_url().starts_with("file://"));
        assert!(query.preview_url().ends_with("lamp.jpg"));
    }

    #[test]
    fn non_image_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "readme.md", b"# hi");
        let err = capture_file(&path, &CaptureConfig::default()).unwrap_err();
        assert!(matches!(err, CaptureError::NotAnImage { ref file_name, .. } if file_name == "readme.md"));
    }

    #[test]
    fn extensionless_file_has_unknown_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "blob", b"data");
        let err = capture_file(&path, &CaptureConfig::default()).unwrap_err();
        assert_eq!(
            err,
            CaptureError::NotAnImage {
                file_name: "blob".into(),
                declared_type: "unknown".into()
            }
        );
    }

    #[test]
    fn empty_and_oversized_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_file(&dir, "empty.png", b"");
        assert_eq!(
            capture_file(&empty, &CaptureConfig::default()).unwrap_err(),
            CaptureError::EmptyFile("empty.png".into())
        );

        let big = write_file(&dir, "big.png", &[0u8; 32]);
        let cfg = CaptureConfig::default().with_max_file_bytes(16);
        assert_eq!(
            capture_file(&big, &cfg).unwrap_err(),
            CaptureError::TooLarge {
                file_name: "big.png".into(),
                size: 32,
                limit: 16
            }
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = capture_file(Path::new("/definitely/not/here.png"), &CaptureConfig::default())
            .unwrap_err();
        assert!(matches!(err, CaptureError::Io { .. }));
    }

    #[test]
    fn drop_uses_declared_type_of_first_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "photo.bin", b"raw");
        let items = vec![
            LocalImage::new(&path).with_declared_type("image/png"),
            LocalImage::new("/nope.txt"),
        ];
        let query = capture_drop(&items, &CaptureConfig::default()).unwrap();
        assert_eq!(query.kind(), QueryKind::File);
    }

    #[test]
    fn empty_drop_is_rejected() {
        assert_eq!(
            capture_drop(&[], &CaptureConfig::default()).unwrap_err(),
            CaptureError::NothingDropped
        );
    }
}
