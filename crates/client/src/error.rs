use catalog::ResponseError;
use thiserror::Error;

/// Message shown to the user for every failed submission.
pub const USER_FACING_MESSAGE: &str = "Failed to process image. Please try again.";

/// Errors surfaced by [`MatchService::submit_query`](crate::MatchService::submit_query).
///
/// The variants keep the cause for logs; the user only ever sees
/// [`USER_FACING_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Client settings are unusable (bad base URL, zero timeout).
    #[error("invalid client config: {0}")]
    InvalidConfig(String),
    /// Downloading the image behind a URL query failed.
    #[error("failed to fetch image from {url}: {reason}")]
    ImageFetch { url: String, reason: String },
    /// The upload request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),
    /// The service answered with a non-success HTTP status.
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },
    /// The body parsed but carried a `status_code` other than 200.
    #[error("service rejected the image (status {status_code}): {message}")]
    Rejected { status_code: i64, message: String },
    /// The body was not the expected JSON shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Coarse failure class, used for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Transport,
    Application,
    Malformed,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Transport => "transport",
            ErrorCategory::Application => "application",
            ErrorCategory::Malformed => "malformed",
        }
    }
}

impl ClientError {
    /// The single user-facing message; transport and application failures are not distinguished.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_MESSAGE
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::InvalidConfig(_) => ErrorCategory::Configuration,
            ClientError::ImageFetch { .. } | ClientError::Transport(_) | ClientError::Status { .. } => {
                ErrorCategory::Transport
            }
            ClientError::Rejected { .. } => ErrorCategory::Application,
            ClientError::Decode(_) => ErrorCategory::Malformed,
        }
    }
}

impl From<ResponseError> for ClientError {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::NonOkStatus {
                status_code,
                message,
            } => ClientError::Rejected {
                status_code,
                message,
            },
            missing @ ResponseError::MissingSection(_) => ClientError::Decode(missing.to_string()),
        }
    }
}
