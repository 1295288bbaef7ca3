use thiserror::Error;

/// Upstream bodies embedded in errors are cut to this many bytes.
const EXCERPT_LEN: usize = 200;

/// Truncate an upstream body for inclusion in an error message.
///
/// Cuts on a character boundary so multi-byte payloads never split.
pub fn body_excerpt(body: &str) -> String {
    if body.len() <= EXCERPT_LEN {
        return body.to_owned();
    }

    let mut end = EXCERPT_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// No valid token could be obtained from the authentication endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication endpoint rejected the request (status {status}): {excerpt}")]
    Rejected { status: u16, excerpt: String },

    #[error("authentication transport failed: {reason}")]
    Transport { reason: String },

    #[error("authentication response was not valid JSON: {reason}")]
    MalformedResponse { reason: String, excerpt: String },

    #[error("authentication succeeded but no token field was present: {excerpt}")]
    MissingToken { excerpt: String },
}

/// The authenticated query was rejected or the upstream was unreachable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("upstream query returned status {status}: {excerpt}")]
    Status { status: u16, excerpt: String },

    #[error("upstream query transport failed: {reason}")]
    Transport { reason: String },

    #[error("upstream body was not valid JSON: {reason}")]
    MalformedBody { reason: String },
}

/// Neither a cached snapshot nor a demo branch could answer the query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no fallback available: {reason}")]
pub struct NoFallbackError {
    pub reason: String,
}

impl NoFallbackError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Top-level error type for the relay pipeline.
///
/// Auth and upstream failures divert into the fallback resolver before
/// anything surfaces, so callers of the pipeline only ever observe the
/// `NoFallback` variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    NoFallback(#[from] NoFallbackError),
}
