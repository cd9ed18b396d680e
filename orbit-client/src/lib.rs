//! # Orbit SDK
//!
//! Async client for the Orbit IoT telemetry platform: device inventory,
//! stream data, actions, and live server-pushed events.
//!
//! ## Overview
//!
//! The SDK splits into three layers. [`OrbitClient`] is the connected
//! facade: it owns a pluggable [`Transport`], an event [`Dispatcher`], and
//! the background worker draining the platform's event feed. Typed
//! sub-clients ([`InventoryClient`], [`StreamClient`], [`ActionClient`])
//! cover the HTTP surface, and every outbound request runs through a
//! retry-aware executor that distinguishes transient failures from
//! rejections.
//!
//! ## Key Features
//!
//! - **Pluggable transport**: the SDK never opens sockets itself; hand it
//!   anything that implements [`Transport`]
//! - **Typed subscriptions**: register [`Handler`] callbacks per device,
//!   stream or action; frames are narrowed before your code runs
//! - **Retry with classification**: transient failures retry under a
//!   configurable budget, rejections surface immediately
//! - **Isolated dispatch**: one failing or panicking subscriber never
//!   starves its siblings or kills the feed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orbit_sdk::{ClientConfig, Device, Handler, OrbitClient, RecordSet};
//!
//! let client = OrbitClient::connect(transport, ClientConfig::default()).await?;
//!
//! // Register a device with a typed stream.
//! let device = client.inventory().create(&device_definition).await?;
//! let stream = device.stream("climate").unwrap();
//!
//! // Live updates for that stream.
//! let handle = client.streams().subscribe(&stream, Handler::data(|_, record| {
//!     println!("temperature: {:?}", record.number("temperature"));
//!     Ok(())
//! }))?;
//!
//! // Push a reading; transient failures retry under the push budget.
//! let record = RecordSet::new(&stream).channel("temperature", 21.5);
//! client.streams().push(&stream, &record).await?;
//!
//! client.unsubscribe(&handle);
//! client.shutdown().await;
//! ```

pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod executor;
pub mod page;
mod routes;
pub mod transport;

// Re-export main types for convenience
pub use client::OrbitClient;
pub use clients::{ActionClient, ActionStatus, InventoryClient, StreamClient};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use executor::{RequestExecutor, RetryPolicy};
pub use page::Page;
pub use transport::{Transport, TransportError};

// Re-export commonly used types from dependencies
pub use orbit_events::{
    DispatchHook, DispatchWorker, Dispatcher, EventStream, Handler, HandlerError, HandlerResult,
    LogHook, SubscriptionHandle, SubscriptionId, SubscriptionKey,
};
pub use orbit_models::{
    Action, ActionEvent, ActionRef, BoundingBox, Channel, ChannelType, ChannelValue, DataQuery,
    Device, DeviceEvent, DeviceQuery, DeviceRef, DistanceUnit, EntityRef, EntityType,
    EventOperation, GeoDistance, GeoPoint, NumericRange, Payload, QueryError, RecordSet, Stream,
    StreamEvent, StreamRef, ValidationError, LOCATION_CHANNEL,
};

/// Prelude module for convenient imports
///
/// Use this to import the most commonly used types and traits:
///
/// ```rust
/// use orbit_sdk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ChannelType, ClientConfig, ClientError, DataQuery, Device, EntityRef, Handler,
        OrbitClient, RecordSet, Result, RetryPolicy, Stream, SubscriptionHandle, Transport,
        TransportError,
    };
}
