//! Error types shared across crates.

/// Rejected before any generation call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unsupported document type: {0}")]
    UnsupportedDocumentType(String),
    #[error("missing mandatory subject parameter")]
    MissingSubject,
}

/// Failure of a single generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: status {status}, body: {body}")]
    Api { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("empty response")]
    EmptyResponse,
    #[error("generation error: {0}")]
    Other(String),
}
