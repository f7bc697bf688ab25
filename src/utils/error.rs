/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

use std::io;

/// Errors produced by a single connect-and-stream cycle.
///
/// None of these are fatal to the [`StreamClient`](crate::client::StreamClient):
/// every one of them is delivered once on the error channel and is followed by the
/// regular reconnect delay.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The HTTP client for the cycle could not be built (TLS backend, proxy setup).
    #[error("http client setup failed: {0}")]
    ClientSetup(#[source] reqwest::Error),
    /// The connection could not be established (DNS, TCP, TLS, ...).
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    /// The server answered with something other than `200 OK`.
    #[error("invalid response status: {0}")]
    InvalidStatus(u16),
    /// A single line did not fit in the configured maximum buffer size.
    #[error("line exceeds the maximum buffer size of {limit} bytes")]
    LineTooLong {
        /// The configured maximum line buffer size, in bytes.
        limit: usize,
    },
    /// The body failed while being read.
    #[error("stream read failed: {0}")]
    Read(#[from] io::Error),
    /// The stream URL derived from the connection does not parse.
    #[error("invalid stream url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl StreamError {
    /// Returns the HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StreamError::InvalidStatus(code) => Some(*code),
            StreamError::Connect(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

/// Errors raised when a stream option is given an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The value is outside the accepted range.
    #[error("invalid value for {option}: {reason}")]
    InvalidValue {
        /// Name of the rejected option.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The endpoint override is not an absolute URL that can carry a path.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint text.
        endpoint: String,
        /// Why the endpoint was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_status_message_contains_code() {
        let err = StreamError::InvalidStatus(503);
        assert!(err.to_string().contains("503"));
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_line_too_long_message() {
        let err = StreamError::LineTooLong { limit: 16 };
        assert_eq!(
            err.to_string(),
            "line exceeds the maximum buffer size of 16 bytes"
        );
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_read_error_from_io() {
        let err: StreamError = io::Error::new(io::ErrorKind::ConnectionReset, "reset").into();
        assert!(matches!(err, StreamError::Read(_)));
        assert!(err.to_string().starts_with("stream read failed"));
    }

    #[test]
    fn test_client_setup_error_is_not_a_connect_failure() {
        let builder_err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err = StreamError::ClientSetup(builder_err);
        assert!(err.to_string().starts_with("http client setup failed"));
        assert!(!matches!(err, StreamError::Connect(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            option: "max_line_buffer_size",
            reason: "must be greater than 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for max_line_buffer_size: must be greater than 0"
        );
    }
}
