//! Error types for the plinth client
//!
//! Defines the crate-wide `Error` enum using thiserror, the `ApiError`
//! domain error that is the only failure shape the request pipeline
//! surfaces to callers, and the normalization of raw dispatch failures
//! into `ApiError`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatch::DispatchError;

/// Main error type for plinth client operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors, detected before any network I/O
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Normalized platform API error
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes defined by the platform API.
pub mod codes {
    /// The platform could not be reached at all.
    pub const CONNECTION_FAILED: i32 = 100;
    /// An error response body could not be parsed as JSON.
    pub const INVALID_JSON: i32 = 107;
}

/// Normalized platform error: a numeric code plus a human-readable message.
///
/// Constructed exclusively by the normalizer below; no transport-specific or
/// collaborator-specific error shape crosses the `Client::request` boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

/// Wire shape of a platform error body.
#[derive(Deserialize)]
struct ErrorBody {
    code: i32,
    error: String,
}

impl ApiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Normalize a raw dispatch failure into the single domain error shape.
    ///
    /// Rejections that carry a response body are parsed as
    /// `{"code": <int>, "error": <string>}`; a body that does not match that
    /// shape becomes `INVALID_JSON` with the raw text attached. Rejections
    /// without a body (the host was never reached, or the transport itself
    /// failed) become `CONNECTION_FAILED`.
    pub(crate) fn from_dispatch(failure: DispatchError) -> Self {
        match failure {
            DispatchError::Rejected { body, .. } => {
                match serde_json::from_str::<ErrorBody>(&body) {
                    Ok(parsed) => ApiError::new(parsed.code, parsed.error),
                    Err(_) => ApiError::new(
                        codes::INVALID_JSON,
                        format!("received an error with invalid JSON: {}", body),
                    ),
                }
            }
            other => ApiError::request_failed(other),
        }
    }

    /// Connection-failure error for rejections that carry no response text.
    pub(crate) fn request_failed(cause: impl fmt::Display) -> Self {
        ApiError::new(
            codes::CONNECTION_FAILED,
            format!("request failed: {}", cause),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_structured_error_body() {
        let failure = DispatchError::Rejected {
            status: 400,
            body: r#"{"code":101,"error":"invalid"}"#.to_string(),
        };

        let error = ApiError::from_dispatch(failure);
        assert_eq!(error.code, 101);
        assert_eq!(error.message, "invalid");
    }

    #[test]
    fn malformed_body_becomes_invalid_json() {
        let failure = DispatchError::Rejected {
            status: 500,
            body: "<html>Bad Gateway</html>".to_string(),
        };

        let error = ApiError::from_dispatch(failure);
        assert_eq!(error.code, codes::INVALID_JSON);
        assert!(error.message.contains("<html>Bad Gateway</html>"));
    }

    #[test]
    fn valid_json_without_error_fields_becomes_invalid_json() {
        let failure = DispatchError::Rejected {
            status: 400,
            body: r#"{"something":1}"#.to_string(),
        };

        let error = ApiError::from_dispatch(failure);
        assert_eq!(error.code, codes::INVALID_JSON);
    }

    #[test]
    fn connection_failure_maps_to_connection_failed() {
        let error = ApiError::from_dispatch(DispatchError::ConnectionFailed);
        assert_eq!(error.code, codes::CONNECTION_FAILED);
        assert!(error.message.starts_with("request failed: "));
    }

    #[test]
    fn transport_failure_maps_to_connection_failed() {
        let failure = DispatchError::Transport {
            message: "socket closed".to_string(),
        };

        let error = ApiError::from_dispatch(failure);
        assert_eq!(error.code, codes::CONNECTION_FAILED);
        assert!(error.message.contains("socket closed"));
    }

    #[test]
    fn error_display_includes_code() {
        let error = ApiError::new(209, "invalid session token");
        assert_eq!(error.to_string(), "invalid session token (code 209)");
    }

    proptest! {
        // The normalizer is total: any body text yields either the parsed
        // platform error or INVALID_JSON carrying the raw text.
        #[test]
        fn normalizer_never_panics(body in ".*", status in 400u16..600) {
            let error = ApiError::from_dispatch(DispatchError::Rejected {
                status,
                body: body.clone(),
            });
            if error.code == codes::INVALID_JSON {
                prop_assert!(error.message.contains(&body));
            }
        }
    }
}
