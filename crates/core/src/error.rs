use http::StatusCode;
use thiserror::Error;

/// Error enum for crate-specific errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A non-success HTTP status was returned for one of the pages.
    #[error("request failed with status {status}: {url}")]
    HttpRequestFailed {
        /// The url of the failed page request.
        url: String,

        /// The returned status code.
        status: StatusCode,
    },

    /// A filter value was a sequence, but it did not have exactly two elements.
    #[error("invalid number of elements in filter value: expected 2, received {0}")]
    InvalidArgumentCount(usize),

    /// This string is not an ISO 8601 date or datetime.
    #[error("date {0} is not in a valid format, use a timestamp or an ISO 8601 string")]
    InvalidDateFormat(String),

    /// This value is not a well-known text geometry.
    #[error("geometry must be in well-known text format: {0}")]
    InvalidGeometryFormat(String),

    /// A returned feature did not have a string `"id"` field.
    #[error("feature has no \"id\" string field")]
    MissingId,

    /// Every page up to the page ceiling returned items.
    #[error("the query is too large, it did not finish within {0} pages")]
    QueryTooLarge(usize),

    /// [reqwest::Error]
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// A filter value was neither a string nor a two-element sequence.
    #[error("filter values can be either a string or a sequence of two values, got {0}")]
    UnsupportedArgumentType(String),

    /// [url::ParseError]
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}
