//! Telemetry values and the records that carry them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::{ChannelType, Stream, StreamRef};
use crate::error::ValidationError;

/// Conventional channel name geographic queries evaluate against.
pub const LOCATION_CHANNEL: &str = "location";

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Great-circle distance to `other`, in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
        // Rounding can push the radicand past 1.0 near antipodes, where
        // asin would go undefined.
        2.0 * EARTH_RADIUS_M * h.min(1.0).sqrt().asin()
    }
}

/// One channel reading.
///
/// Serialized untagged, so records read and write as plain JSON maps like
/// `{"temperature": 21.5, "comfortable": true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelValue {
    Boolean(bool),
    Number(f64),
    Geo(GeoPoint),
    String(String),
}

impl ChannelValue {
    /// The declared type this value satisfies.
    pub fn channel_type(&self) -> ChannelType {
        match self {
            Self::Boolean(_) => ChannelType::Boolean,
            Self::Number(_) => ChannelType::Number,
            Self::Geo(_) => ChannelType::GeoPoint,
            Self::String(_) => ChannelType::String,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_geo(&self) -> Option<&GeoPoint> {
        match self {
            Self::Geo(point) => Some(point),
            _ => None,
        }
    }
}

impl From<f64> for ChannelValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ChannelValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for ChannelValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for ChannelValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ChannelValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<GeoPoint> for ChannelValue {
    fn from(value: GeoPoint) -> Self {
        Self::Geo(value)
    }
}

/// One timestamped set of channel readings for a stream.
///
/// Built fluently against a [`Stream`] descriptor, which also gives the
/// record its back-reference for pushing:
///
/// ```
/// # use orbit_models::{ChannelType, RecordSet, Stream};
/// let stream = Stream::new("climate")
///     .channel("temperature", ChannelType::Number)
///     .for_device("dev-1");
/// let record = RecordSet::new(&stream).channel("temperature", 21.5);
/// assert_eq!(record.number("temperature"), Some(21.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(skip)]
    stream: Option<StreamRef>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub channels: BTreeMap<String, ChannelValue>,
}

impl RecordSet {
    /// Starts an empty record for `stream`, timestamped now.
    pub fn new(stream: &Stream) -> Self {
        let stream_ref = stream.device_id.as_ref().map(|device_id| StreamRef {
            device_id: device_id.clone(),
            name: stream.name.clone(),
        });
        Self {
            stream: stream_ref,
            timestamp: Utc::now(),
            channels: BTreeMap::new(),
        }
    }

    /// Sets a channel reading.
    pub fn channel(mut self, name: impl Into<String>, value: impl Into<ChannelValue>) -> Self {
        self.channels.insert(name.into(), value.into());
        self
    }

    /// Sets the conventional location channel.
    pub fn location(self, point: GeoPoint) -> Self {
        self.channel(LOCATION_CHANNEL, point)
    }

    /// Overrides the record timestamp.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The stream this record was built for, when known.
    pub fn stream(&self) -> Option<&StreamRef> {
        self.stream.as_ref()
    }

    pub fn value(&self, channel: &str) -> Option<&ChannelValue> {
        self.channels.get(channel)
    }

    pub fn number(&self, channel: &str) -> Option<f64> {
        self.value(channel).and_then(ChannelValue::as_number)
    }

    /// Checks every reading against the stream's declared channels.
    pub fn validate(&self, stream: &Stream) -> Result<(), ValidationError> {
        for (name, value) in &self.channels {
            let channel = stream
                .channels
                .get(name)
                .ok_or_else(|| ValidationError::UnknownChannel(name.clone()))?;
            let actual = value.channel_type();
            if actual != channel.channel_type {
                return Err(ValidationError::TypeMismatch {
                    channel: name.clone(),
                    expected: channel.channel_type,
                    actual,
                });
            }
        }
        Ok(())
    }
}

impl Default for RecordSet {
    fn default() -> Self {
        Self {
            stream: None,
            timestamp: Utc::now(),
            channels: BTreeMap::new(),
        }
    }
}
