//! The client facade: one connected handle to the platform.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use orbit_events::{DispatchWorker, Dispatcher, Handler, SubscriptionHandle};
use orbit_models::EntityRef;

use crate::clients::{ActionClient, InventoryClient, StreamClient};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::executor::{RequestExecutor, RetryPolicy};
use crate::transport::Transport;

/// Entry point to the SDK.
///
/// An `OrbitClient` owns the transport, the subscription dispatcher, and
/// the background worker that drains the platform's event feed. Outbound
/// requests and inbound event dispatch never block each other: any number
/// of tasks may issue requests while the worker fans out events.
pub struct OrbitClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) executor: RequestExecutor,
    pub(crate) config: ClientConfig,
    worker: DispatchWorker,
}

impl OrbitClient {
    /// Connect to the platform through `transport`.
    ///
    /// Opens the event feed and spawns the dispatch worker on the current
    /// runtime. Fails with [`ClientError::Events`] when the feed cannot be
    /// established.
    pub async fn connect(transport: Arc<dyn Transport>, config: ClientConfig) -> Result<Self> {
        Self::with_dispatcher(transport, config, Arc::new(Dispatcher::new())).await
    }

    /// Like [`OrbitClient::connect`], but with a caller-provided dispatcher,
    /// for a custom failure hook or subscriptions registered ahead of the
    /// first frame.
    pub async fn with_dispatcher(
        transport: Arc<dyn Transport>,
        config: ClientConfig,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<Self> {
        let events = transport.events().await.map_err(ClientError::Events)?;
        let worker = DispatchWorker::spawn(events, dispatcher.clone());
        tracing::info!("orbit client connected");

        Ok(Self {
            transport,
            dispatcher,
            executor: RequestExecutor,
            config,
            worker,
        })
    }

    /// Device inventory operations.
    pub fn inventory(&self) -> InventoryClient<'_> {
        InventoryClient::new(self)
    }

    /// Stream data operations.
    pub fn streams(&self) -> StreamClient<'_> {
        StreamClient::new(self)
    }

    /// Action operations.
    pub fn actions(&self) -> ActionClient<'_> {
        ActionClient::new(self)
    }

    /// The subscription registry behind this client.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Remove a subscription. Returns `false` when the handle was already
    /// spent; unsubscribing twice is harmless.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.dispatcher.unsubscribe(handle)
    }

    /// Stop the dispatch worker, letting any in-flight fan-out finish, then
    /// drop every subscription.
    pub async fn shutdown(self) {
        self.worker.shutdown().await;
        self.dispatcher.clear();
        tracing::info!("orbit client shut down");
    }

    pub(crate) fn subscribe(&self, entity: EntityRef, handler: Handler) -> SubscriptionHandle {
        self.dispatcher.subscribe(entity, handler)
    }

    pub(crate) async fn get(&self, policy: Option<&RetryPolicy>, path: &str) -> Result<Value> {
        self.executor
            .execute(policy, || async move { self.transport.get(path).await })
            .await
    }

    pub(crate) async fn put(
        &self,
        policy: Option<&RetryPolicy>,
        path: &str,
        body: Value,
    ) -> Result<Value> {
        self.executor
            .execute(policy, || {
                let body = body.clone();
                async move { self.transport.put(path, body).await }
            })
            .await
    }

    pub(crate) async fn post(
        &self,
        policy: Option<&RetryPolicy>,
        path: &str,
        body: Value,
    ) -> Result<Value> {
        self.executor
            .execute(policy, || {
                let body = body.clone();
                async move { self.transport.post(path, body).await }
            })
            .await
    }

    pub(crate) async fn delete(&self, policy: Option<&RetryPolicy>, path: &str) -> Result<Value> {
        self.executor
            .execute(policy, || async move { self.transport.delete(path).await })
            .await
    }
}

impl fmt::Debug for OrbitClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrbitClient")
            .field("subscriptions", &self.dispatcher.len())
            .finish_non_exhaustive()
    }
}
