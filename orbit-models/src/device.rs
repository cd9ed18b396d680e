//! Client-side descriptors for the entities the platform exposes.
//!
//! A [`Device`] owns named [`Stream`]s (each declaring typed [`Channel`]s)
//! and named [`Action`]s. These are descriptions of remote objects used to
//! address routes, validate pushed data, and subscribe to events; they are
//! not persistence records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::payload::EntityType;

/// Value types a channel can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Number,
    String,
    Boolean,
    #[serde(rename = "geopoint")]
    GeoPoint,
}

impl ChannelType {
    /// Parses a declared type name as it appears on the wire.
    pub fn parse(name: &str) -> Result<Self, ValidationError> {
        match name {
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            "geopoint" => Ok(Self::GeoPoint),
            other => Err(ValidationError::UnsupportedChannelType(other.to_string())),
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::GeoPoint => "geopoint",
        };
        f.write_str(name)
    }
}

/// One declared channel of a stream: a name, a value type, and optionally a
/// measurement unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub unit: Option<String>,
}

impl Channel {
    pub fn new(name: impl Into<String>, channel_type: ChannelType) -> Self {
        Self {
            name: name.into(),
            channel_type,
            unit: None,
        }
    }

    /// Sets the measurement unit (for display purposes only).
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }
}

/// A named series of records belonging to a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub name: String,
    #[serde(rename = "deviceId", skip_serializing_if = "Option::is_none", default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub channels: BTreeMap<String, Channel>,
}

impl Stream {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_id: None,
            channels: BTreeMap::new(),
        }
    }

    /// Declares a channel on this stream.
    pub fn channel(mut self, name: impl Into<String>, channel_type: ChannelType) -> Self {
        let name = name.into();
        self.channels
            .insert(name.clone(), Channel::new(name, channel_type));
        self
    }

    /// Stamps the owning device id onto this stream.
    pub fn for_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        for channel in self.channels.values() {
            channel.validate()?;
        }
        Ok(())
    }

    /// Subscribable identity of this stream. Requires the owning device id.
    pub fn entity_ref(&self) -> Result<EntityRef, ValidationError> {
        match &self.device_id {
            Some(device_id) => Ok(EntityRef::stream(device_id.clone(), self.name.clone())),
            None => Err(ValidationError::MissingDeviceId),
        }
    }
}

/// An operation a device can perform, optionally tracking a status string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(rename = "deviceId", skip_serializing_if = "Option::is_none", default)]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<String>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_id: None,
            description: None,
            status: None,
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn for_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Subscribable identity of this action. Requires the owning device id.
    pub fn entity_ref(&self) -> Result<EntityRef, ValidationError> {
        match &self.device_id {
            Some(device_id) => Ok(EntityRef::action(device_id.clone(), self.name.clone())),
            None => Err(ValidationError::MissingDeviceId),
        }
    }
}

/// A registered device: identity, metadata, and its declared streams and
/// actions. The id is assigned by the platform on registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub streams: BTreeMap<String, Stream>,
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
}

impl Device {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            streams: BTreeMap::new(),
            actions: BTreeMap::new(),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Declares a stream on this device.
    pub fn with_stream(mut self, stream: Stream) -> Self {
        self.streams.insert(stream.name.clone(), stream);
        self
    }

    /// Declares an action on this device.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.insert(action.name.clone(), action);
        self
    }

    /// Looks up a declared stream, stamped with this device's id.
    pub fn stream(&self, name: &str) -> Option<Stream> {
        let mut stream = self.streams.get(name)?.clone();
        stream.device_id = self.id.clone();
        Some(stream)
    }

    /// Looks up a declared action, stamped with this device's id.
    pub fn action(&self, name: &str) -> Option<Action> {
        let mut action = self.actions.get(name)?.clone();
        action.device_id = self.id.clone();
        Some(action)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        for stream in self.streams.values() {
            stream.validate()?;
        }
        for action in self.actions.values() {
            action.validate()?;
        }
        Ok(())
    }

    /// The platform-assigned id, or an error when the device was never
    /// registered.
    pub fn require_id(&self) -> Result<&str, ValidationError> {
        self.id.as_deref().ok_or(ValidationError::MissingEntityId)
    }

    /// Subscribable identity of this device. Requires the id.
    pub fn entity_ref(&self) -> Result<EntityRef, ValidationError> {
        Ok(EntityRef::device(self.require_id()?))
    }
}

/// Identity of a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceRef {
    pub device_id: String,
}

/// Identity of a stream, scoped to its owning device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamRef {
    pub device_id: String,
    pub name: String,
}

/// Identity of an action, scoped to its owning device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRef {
    pub device_id: String,
    pub name: String,
}

/// Typed identity of any subscribable entity.
///
/// Events on the wire are scoped per device, so every variant carries the
/// owning device id; stream and action refs additionally name the entity so
/// adapters can narrow deliveries down to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Device(DeviceRef),
    Stream(StreamRef),
    Action(ActionRef),
}

impl EntityRef {
    pub fn device(device_id: impl Into<String>) -> Self {
        Self::Device(DeviceRef {
            device_id: device_id.into(),
        })
    }

    pub fn stream(device_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Stream(StreamRef {
            device_id: device_id.into(),
            name: name.into(),
        })
    }

    pub fn action(device_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Action(ActionRef {
            device_id: device_id.into(),
            name: name.into(),
        })
    }

    /// The payload kind this entity produces.
    pub fn kind(&self) -> EntityType {
        match self {
            Self::Device(_) => EntityType::Device,
            Self::Stream(_) => EntityType::Stream,
            Self::Action(_) => EntityType::Action,
        }
    }

    /// The owning device id.
    pub fn device_id(&self) -> &str {
        match self {
            Self::Device(r) => &r.device_id,
            Self::Stream(r) => &r.device_id,
            Self::Action(r) => &r.device_id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(r) => write!(f, "device {}", r.device_id),
            Self::Stream(r) => write!(f, "stream {}/{}", r.device_id, r.name),
            Self::Action(r) => write!(f, "action {}/{}", r.device_id, r.name),
        }
    }
}
