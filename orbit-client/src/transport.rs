//! Transport seam between the SDK and the platform.
//!
//! The SDK never talks to the network itself. A [`Transport`] implementation
//! owns connections, authentication and framing; the SDK hands it paths and
//! JSON bodies and receives JSON documents back, plus one long-lived stream
//! of raw event frames.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use orbit_events::EventStream;

/// Failures raised at the transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("request was cancelled mid-flight")]
    Cancelled,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("server error: status {0}")]
    Server(u16),

    /// The platform refused the request as ill-formed or unauthorized.
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The response body was not valid JSON.
    #[error("unreadable response body: {0}")]
    Body(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Timeouts, cancellations, connection failures and server-side errors
    /// are transient. A rejection or an unreadable body will not get better
    /// by asking again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::Cancelled | Self::Connection(_) | Self::Server(_)
        )
    }
}

/// Carries requests and the event feed for an [`OrbitClient`](crate::OrbitClient).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, TransportError>;

    async fn put(&self, path: &str, body: Value) -> Result<Value, TransportError>;

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError>;

    async fn delete(&self, path: &str) -> Result<Value, TransportError>;

    /// Open the platform's event feed. Each item is one raw encoded payload.
    async fn events(&self) -> Result<EventStream, TransportError>;
}
