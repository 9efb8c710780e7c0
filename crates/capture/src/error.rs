//! Error types produced while capturing an upload.

use thiserror::Error;

/// Reasons a user action did not produce a [`PendingQuery`](crate::PendingQuery).
///
/// None of these reach the network; the upload control simply stays put.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CaptureError {
    /// The control is disabled because a query is already in flight.
    #[error("upload controls are disabled while a query is in flight")]
    Disabled,
    /// A drop event carried no files.
    #[error("nothing was dropped")]
    NothingDropped,
    /// The declared type of the file does not start with the accepted prefix.
    #[error("'{file_name}' is not an image (declared type: {declared_type})")]
    NotAnImage {
        file_name: String,
        declared_type: String,
    },
    /// The URL input was empty after trimming.
    #[error("image URL is empty")]
    EmptyUrl,
    /// The selected file has zero bytes.
    #[error("'{0}' is empty")]
    EmptyFile(String),
    /// The selected file exceeds `max_file_bytes`.
    #[error("'{file_name}' is {size} bytes, limit is {limit}")]
    TooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },
    /// Reading the file from disk failed.
    #[error("failed to read '{path}': {message}")]
    Io { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_file() {
        let err = CaptureError::NotAnImage {
            file_name: "notes.txt".into(),
            declared_type: "text/plain".into(),
        };
        assert!(err.to_string().contains("notes.txt"));
        assert!(err.to_string().contains("text/plain"));

        let err = CaptureError::TooLarge {
            file_name: "big.png".into(),
            size: 20,
            limit: 10,
        };
        assert_eq!(err.to_string(), "'big.png' is 20 bytes, limit is 10");
    }
}
