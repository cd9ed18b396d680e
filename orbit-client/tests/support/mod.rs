//! Shared test transport: scripted responses, recorded requests, and a
//! hand-driven event feed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::mpsc;
use serde_json::Value;

use orbit_sdk::{EventStream, Transport, TransportError};

/// One outbound request as the transport saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Scripted transport for driving the client without a network.
///
/// Responses are consumed from a queue in request order; an empty queue
/// yields `null`, which suits operations that ignore the body.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<Value, TransportError>>>,
    recorded: Mutex<Vec<Recorded>>,
    calls: AtomicU32,
    feed: Mutex<Option<EventStream>>,
    feed_tx: mpsc::UnboundedSender<Bytes>,
}

impl MockTransport {
    pub fn new() -> Self {
        let (feed_tx, feed_rx) = mpsc::unbounded();
        Self {
            script: Mutex::new(VecDeque::new()),
            recorded: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            feed: Mutex::new(Some(Box::pin(feed_rx))),
            feed_tx,
        }
    }

    /// Queue a successful response.
    pub fn enqueue_ok(&self, value: Value) {
        self.script.lock().unwrap().push_back(Ok(value));
    }

    /// Queue a failure.
    pub fn enqueue_err(&self, error: TransportError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Total requests issued, across every verb.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Everything the client sent, in order.
    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    /// Emit one raw frame on the event feed.
    pub fn emit(&self, frame: Bytes) {
        self.feed_tx.unbounded_send(frame).unwrap();
    }

    fn respond(
        &self,
        method: &'static str,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().unwrap().push(Recorded {
            method,
            path: path.to_string(),
            body,
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.respond("GET", path, None)
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.respond("PUT", path, Some(body))
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.respond("POST", path, Some(body))
    }

    async fn delete(&self, path: &str) -> Result<Value, TransportError> {
        self.respond("DELETE", path, None)
    }

    async fn events(&self) -> Result<EventStream, TransportError> {
        self.feed
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| TransportError::Connection("event feed already taken".to_string()))
    }
}

/// Route SDK logs to the test output when `RUST_LOG` asks for them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
