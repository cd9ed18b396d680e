//! Wire format of the platform's event feed.
//!
//! Every pushed frame is a [`Payload`], tagged by the kind of entity it
//! concerns. The tag drives dispatch: subscribers register per entity kind
//! and id, and adapters narrow further on the payload fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::RecordSet;
use crate::device::{ActionRef, StreamRef};

/// Kind of entity an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Device,
    Stream,
    Action,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Device => "device",
            Self::Stream => "stream",
            Self::Action => "action",
        };
        f.write_str(name)
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOperation {
    Create,
    Update,
    Delete,
    Push,
    Invoke,
}

impl fmt::Display for EventOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Push => "push",
            Self::Invoke => "invoke",
        };
        f.write_str(name)
    }
}

/// Lifecycle event for a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEvent {
    pub operation: EventOperation,
    pub entity_id: String,
}

/// Event on a stream: lifecycle, or a pushed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEvent {
    pub operation: EventOperation,
    pub entity_id: String,
    pub stream_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub record: Option<RecordSet>,
}

/// Event on an action: an invocation or a status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEvent {
    pub operation: EventOperation,
    pub entity_id: String,
    pub action_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
}

/// One frame of the event feed, tagged by entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entityType", rename_all = "lowercase")]
pub enum Payload {
    Device(DeviceEvent),
    Stream(StreamEvent),
    Action(ActionEvent),
}

impl Payload {
    /// Builds the frame announcing a pushed record.
    pub fn push(
        device_id: impl Into<String>,
        stream_id: impl Into<String>,
        record: RecordSet,
    ) -> Self {
        Self::Stream(StreamEvent {
            operation: EventOperation::Push,
            entity_id: device_id.into(),
            stream_id: stream_id.into(),
            record: Some(record),
        })
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Device(_) => EntityType::Device,
            Self::Stream(_) => EntityType::Stream,
            Self::Action(_) => EntityType::Action,
        }
    }

    pub fn operation(&self) -> EventOperation {
        match self {
            Self::Device(ev) => ev.operation,
            Self::Stream(ev) => ev.operation,
            Self::Action(ev) => ev.operation,
        }
    }

    /// Id of the device the event is scoped to.
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Device(ev) => &ev.entity_id,
            Self::Stream(ev) => &ev.entity_id,
            Self::Action(ev) => &ev.entity_id,
        }
    }

    /// Stream identity, for stream frames.
    pub fn stream_ref(&self) -> Option<StreamRef> {
        match self {
            Self::Stream(ev) => Some(StreamRef {
                device_id: ev.entity_id.clone(),
                name: ev.stream_id.clone(),
            }),
            _ => None,
        }
    }

    /// Action identity, for action frames.
    pub fn action_ref(&self) -> Option<ActionRef> {
        match self {
            Self::Action(ev) => Some(ActionRef {
                device_id: ev.entity_id.clone(),
                name: ev.action_id.clone(),
            }),
            _ => None,
        }
    }
}
