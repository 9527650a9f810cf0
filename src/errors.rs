use thiserror::Error;

/// All errors that can occur when using the Moondream client.
///
/// Non-2xx HTTP responses are not errors: their body is returned to the
/// caller like any other response.
#[derive(Error, Debug)]
pub enum MoondreamError {
    /// A required argument was missing or unusable (checked before any request is sent).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A transport-level HTTP error from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A convenience alias for `Result<T, MoondreamError>`.
pub type Result<T> = std::result::Result<T, MoondreamError>;
