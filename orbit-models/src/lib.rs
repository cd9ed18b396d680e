//! # orbit-models
//!
//! Data model for the Orbit telemetry platform SDK: client-side entity
//! descriptors (devices, streams, channels, actions), the tagged event
//! payload decoded off the wire, timestamped record sets, and the composable
//! search query builder.
//!
//! Everything in this crate is plain data. Network calls, dispatch, and
//! retry live in the sibling crates.

mod data;
mod device;
mod error;
mod payload;
mod query;

pub use data::*;
pub use device::*;
pub use error::*;
pub use payload::*;
pub use query::*;
