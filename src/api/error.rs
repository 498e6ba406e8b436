use reqwest::StatusCode;
use thiserror::Error;

/// How the client reports failed requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Every failure is handed back as the underlying `reqwest::Error`, untouched.
    #[default]
    Passthrough,
    /// Failures are sorted into network, unauthorized, server, and rejected kinds.
    Classified,
}

/// Possible errors while talking to the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP library's own error, as-is. Only produced in `ErrorMode::Passthrough`.
    #[error(transparent)]
    Http(reqwest::Error),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unauthorized ({status}): {body}")]
    Unauthorized { status: StatusCode, body: String },

    #[error("server error ({status}): {body}")]
    Server { status: StatusCode, body: String },

    #[error("request rejected ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// The HTTP status the server answered with, if we got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http(error) | ApiError::Network(error) | ApiError::Decode(error) => {
                error.status()
            }
            ApiError::Unauthorized { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::Rejected { status, .. } => Some(*status),
            ApiError::InvalidBaseUrl { .. } => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Sorts a non-2xx response into its classified kind.
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized { status, body }
        } else if status.is_server_error() {
            ApiError::Server { status, body }
        } else {
            ApiError::Rejected { status, body }
        }
    }
}
