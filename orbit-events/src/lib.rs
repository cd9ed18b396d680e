//! # orbit-events
//!
//! Subscription management and event dispatch for the Orbit platform.
//!
//! This crate owns the client's in-process event plane: callers register
//! typed handlers against entities, and a background worker decodes the
//! platform's raw event feed and fans frames out to the matching handlers.
//! It knows nothing about transports; the feed arrives as an opaque stream
//! of byte frames.

mod handler;
mod hook;
mod registry;
mod worker;

pub use handler::*;
pub use hook::*;
pub use registry::*;
pub use worker::*;
