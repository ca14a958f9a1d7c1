//! Directions client error types.

/// Errors from the directions provider.
///
/// None of these are fatal to planning: the sequencer answers every one of
/// them by falling back to its local heuristic.
#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success HTTP status
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Provider answered, but with a non-OK status field
    #[error("provider status {status}: {message}")]
    ProviderStatus { status: String, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json { message: String, body: Option<String> },

    /// Response parsed but lacked a usable optimized order
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Invalid API key or unauthorized
    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    /// Client could not be configured
    #[error("not configured: {0}")]
    NotConfigured(String),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|body| format!(" (body: {body})"))
        .unwrap_or_default()
}
