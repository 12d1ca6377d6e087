use thiserror::Error;

/// Failure of a remote call
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("not authenticated: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Other(String),
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// True when the server answered 404 for the requested resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
