//! Error taxonomy for client operations.
//!
//! Every outbound call fails with exactly one classification: the retry
//! budget ran out on a transient failure, the platform rejected the request
//! outright, the response could not be understood, or the call never left
//! the process because its inputs failed local validation.

use thiserror::Error;

use orbit_models::{QueryError, ValidationError};

use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Every attempt failed transiently and the retry budget is spent.
    #[error("request failed after {attempts} attempts: {source}")]
    Transient {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// The platform rejected the request; retrying would not change that.
    #[error("request rejected: {0}")]
    Request(#[source] TransportError),

    /// A JSON body could not be converted to or from the expected shape.
    #[error("malformed JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response decoded but lacks a field the operation requires.
    #[error("response is missing required field '{0}'")]
    IncompleteResponse(&'static str),

    /// The input failed local validation before any network call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The query was misconfigured before any network call.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The event feed could not be established.
    #[error("event feed unavailable: {0}")]
    Events(#[source] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_error_names_attempt_count() {
        let error = ClientError::Transient {
            attempts: 4,
            source: TransportError::Timeout,
        };
        assert_eq!(
            error.to_string(),
            "request failed after 4 attempts: request timed out"
        );
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let error = ClientError::from(ValidationError::MissingDeviceId);
        assert_eq!(error.to_string(), "Missing device id");
    }
}
