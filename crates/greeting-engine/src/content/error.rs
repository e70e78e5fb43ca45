use thiserror::Error;

/// Failures while loading the personalization document.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The server answered with a non-success status.
    #[error("unable to load {url} ({status})")]
    Status { url: String, status: u16 },

    /// The request never produced a response.
    #[error("request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The body was not a flat JSON object.
    #[error("invalid customization document: {0}")]
    Parse(#[from] serde_json::Error),
}
