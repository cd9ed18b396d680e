//! Error types for the Orbit data model.
//!
//! These are construction-time failures: they fire while building or
//! checking model values, before anything touches the network.

use thiserror::Error;

use crate::device::ChannelType;

/// Validation failures for entity descriptors and record sets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An entity or channel was declared with an empty name.
    #[error("Name cannot be empty")]
    EmptyName,

    /// A channel declared a type outside the supported set.
    #[error("Unsupported channel type: {0}")]
    UnsupportedChannelType(String),

    /// A record carries a channel the stream does not declare.
    #[error("Channel '{0}' is not declared on the stream")]
    UnknownChannel(String),

    /// A record value does not match the channel's declared type.
    #[error("Channel '{channel}' expects {expected}, got {actual}")]
    TypeMismatch {
        channel: String,
        expected: ChannelType,
        actual: ChannelType,
    },

    /// The operation needs a device id the entity does not carry yet.
    #[error("Missing device id")]
    MissingDeviceId,

    /// The operation needs an entity id the descriptor does not carry yet.
    #[error("Missing entity id")]
    MissingEntityId,

    /// The record has no stream back-reference to address a route with.
    #[error("Record has no stream reference")]
    MissingStreamRef,
}

/// Misconfigured search predicates, rejected at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    /// Geo-distance predicates need a strictly positive radius.
    #[error("Distance radius must be positive, got {0}")]
    NonPositiveRadius(f64),
}
