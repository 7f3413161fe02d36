use stockcheck_core::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// Maps the failure onto the response-level classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Http(_) | FetchError::InvalidUrl { .. } => ErrorKind::Transport,
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::UnexpectedStatus { .. } => ErrorKind::HttpStatus,
        }
    }

    /// The error message followed by every distinct message in its source
    /// chain, e.g. `"HTTP error: error sending request: connection refused"`.
    ///
    /// `reqwest` keeps the interesting part (DNS, TLS, timeout) in the
    /// source chain, so the top-level `Display` alone is not enough for
    /// diagnostics.
    #[must_use]
    pub fn detailed_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }
}

/// Why the embedded page-state block could not be used.
#[derive(Debug, Error)]
pub enum StructuredStateError {
    #[error("no structured state block in page")]
    NotFound,

    #[error("structured state block is not terminated")]
    Unterminated,

    #[error("structured state is not valid JSON even after cleanup: {0}")]
    Malformed(#[source] serde_json::Error),
}
