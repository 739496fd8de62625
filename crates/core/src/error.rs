/// Errors produced by rating-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("script text is empty")]
    EmptyScript,

    #[error("scene {0} not found")]
    SceneNotFound(u32),

    #[error("unknown modification strategy: {0}")]
    UnknownStrategy(String),

    #[error("invalid parameters for strategy {strategy}: {reason}")]
    InvalidParams { strategy: String, reason: String },

    #[error("invalid rating string: {0}")]
    InvalidRating(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("regex compilation failed: {0}")]
    Pattern(#[from] regex::Error),

    /// An external ML-service call (LLM rewrite, embedding) exceeded its
    /// deadline after exhausting retries.
    #[error("external service timed out: {0}")]
    MLTimeout(String),

    /// An external ML-service call failed at the transport layer
    /// (connection refused, DNS, reset) after exhausting retries.
    #[error("external service unavailable: {0}")]
    MLUnavailable(String),

    /// An external ML-service call returned a non-2xx HTTP status.
    /// Never retried — a protocol error is not transient.
    #[error("external service returned an error status: {0}")]
    MLProtocolError(String),

    /// Catch-all for external-capability failures that don't fit the
    /// transport/protocol split above (e.g. malformed response bodies).
    #[error("external capability failed: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
