use thiserror::Error;

/// Errors from [`crate::TransitDirectionsProvider::transit_directions`].
///
/// URLs carried by these variants never include credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectionsError {
    /// The request could not reach the provider.
    #[error("network error for {url}: {message}")]
    NetworkError {
        /// Redacted request URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The provider did not answer within the timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Redacted request URL.
        url: String,
        /// Timeout applied to the request.
        timeout_secs: u64,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Redacted request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The provider reported an application-level failure.
    #[error("directions service returned {code}: {message}")]
    ServiceError {
        /// Provider status code such as `"REQUEST_DENIED"`.
        code: String,
        /// Provider error message, possibly empty.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse directions response: {message}")]
    ParseError {
        /// Decoder error description.
        message: String,
    },
    /// The request context was cancelled or expired before completion.
    #[error("directions request cancelled")]
    Cancelled,
}
