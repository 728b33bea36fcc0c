/// Error types for the PassBy[ME] client
/// Local validation failures, HTTP-level failures and service-reported
/// errors are kept apart so callers can react to each one differently.

use thiserror::Error;

use crate::transport::HttpResponse;

/// Errors returned by every client operation
#[derive(Debug, Error)]
pub enum Error {
    /// The caller supplied missing or invalid input. Raised before any request is sent.
    #[error("{0}")]
    InvalidArgument(String),

    /// Non-2xx status (other than 420) or a response without a body
    #[error("An HTTP error occurred! (status {})", .response.status)]
    Transport { response: HttpResponse },

    /// HTTP 420: the service rejected the request with a structured payload
    #[error("A PassBy[ME] specific error occurred: {payload}")]
    Service { payload: serde_json::Value },

    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing JSON field: {0}")]
    MissingField(&'static str),

    #[error("JSON field {field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid expiration date {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Failure inside the HTTP stack: TLS setup, DNS, connect, read
    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// True for malformed JSON and for well-formed JSON that breaks the response contract
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Error::Parse(_)
                | Error::MissingField(_)
                | Error::InvalidField { .. }
                | Error::InvalidTimestamp { .. }
        )
    }

    /// Payload of a service-reported (420) error
    pub fn service_payload(&self) -> Option<&serde_json::Value> {
        match self {
            Error::Service { payload } => Some(payload),
            _ => None,
        }
    }

    /// Raw response behind an HTTP-level failure
    pub fn http_response(&self) -> Option<&HttpResponse> {
        match self {
            Error::Transport { response } => Some(response),
            _ => None,
        }
    }
}
