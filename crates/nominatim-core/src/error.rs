//! Error types for the Nominatim client.

/// Errors that can occur while configuring or executing a Nominatim request.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body is not well-formed XML.
    #[error("malformed XML response: {0}")]
    Xml(#[from] roxmltree::Error),

    /// An option name that is not in the allow-list.
    #[error("invalid option '{0}'")]
    UnknownOption(String),

    /// An option carried a value that failed validation.
    #[error("invalid value for option '{option}': {reason}")]
    InvalidOptionValue {
        /// Name of the offending option.
        option: &'static str,
        /// What was wrong with the value.
        reason: String,
    },

    /// A required option was not supplied.
    #[error("required option '{0}' is missing")]
    MissingOption(&'static str),

    /// The request parameters are contradictory or empty.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The server answered with a non-success HTTP status.
    #[error("request to '{url}' failed with HTTP status {status}")]
    HttpStatus {
        /// Final request URL.
        url: String,
        /// Status code returned by the server.
        status: u16,
    },

    /// The request kept failing after the configured number of retries.
    #[error("request to '{url}' failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Final request URL.
        url: String,
        /// Number of attempts performed, including the first one.
        attempts: u32,
        /// Transport error from the last attempt.
        source: reqwest::Error,
    },

    /// The server answered with something other than `text/xml`.
    #[error("unsupported content type '{0}', expected text/xml")]
    UnsupportedContentType(String),

    /// Nominatim itself reported an error in the response payload.
    #[error("Nominatim error (code {}): {message}", .code.as_deref().unwrap_or("unknown"))]
    Server {
        /// Error code, when the payload carries one.
        code: Option<String>,
        /// Human-readable message from the server.
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
