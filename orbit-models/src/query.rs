//! Search predicates for historical records and device listings.
//!
//! A [`DataQuery`] combines independent predicates with AND semantics. It
//! serializes to the search body the platform expects, and can also be
//! evaluated locally against a [`RecordSet`] with [`DataQuery::matches`],
//! which keeps client-side filtering consistent with the server's rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{ChannelValue, GeoPoint, RecordSet, LOCATION_CHANNEL};
use crate::error::QueryError;

/// Unit a geographic radius is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Kilometers,
    Meters,
}

impl DistanceUnit {
    fn to_meters(self) -> f64 {
        match self {
            Self::Kilometers => 1_000.0,
            Self::Meters => 1.0,
        }
    }
}

/// Inclusive numeric bounds on one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub channel: String,
    pub min: f64,
    pub max: f64,
}

/// Radius around a center point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoDistance {
    pub center: GeoPoint,
    pub radius: f64,
    pub unit: DistanceUnit,
}

impl GeoDistance {
    fn radius_meters(&self) -> f64 {
        self.radius * self.unit.to_meters()
    }
}

/// Axis-aligned geographic box, stored with normalized corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub sw: GeoPoint,
    pub ne: GeoPoint,
}

impl BoundingBox {
    /// Builds a box from any two opposite corners.
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            sw: GeoPoint::new(a.longitude.min(b.longitude), a.latitude.min(b.latitude)),
            ne: GeoPoint::new(a.longitude.max(b.longitude), a.latitude.max(b.latitude)),
        }
    }

    /// Whether `point` falls inside the box, borders included.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.longitude >= self.sw.longitude
            && point.longitude <= self.ne.longitude
            && point.latitude >= self.sw.latitude
            && point.latitude <= self.ne.latitude
    }
}

/// Search predicates over a stream's records. All predicates are optional
/// and an empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuery {
    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub from: Option<DateTime<Utc>>,
    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub range: Option<NumericRange>,
    #[serde(rename = "geo", skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<GeoDistance>,
    #[serde(rename = "bbox", skip_serializing_if = "Option::is_none", default)]
    pub bounding_box: Option<BoundingBox>,
}

impl DataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts matches to timestamps within `[from, to]`.
    pub fn time_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Restricts one numeric channel to `[min, max]`.
    pub fn range(mut self, channel: impl Into<String>, min: f64, max: f64) -> Self {
        self.range = Some(NumericRange {
            channel: channel.into(),
            min,
            max,
        });
        self
    }

    /// Restricts the location channel to a radius around `center`.
    pub fn distance(
        mut self,
        center: GeoPoint,
        radius: f64,
        unit: DistanceUnit,
    ) -> Result<Self, QueryError> {
        if radius <= 0.0 {
            return Err(QueryError::NonPositiveRadius(radius));
        }
        self.distance = Some(GeoDistance {
            center,
            radius,
            unit,
        });
        Ok(self)
    }

    /// Restricts the location channel to the box spanned by two corners.
    pub fn bounding_box(mut self, a: GeoPoint, b: GeoPoint) -> Self {
        self.bounding_box = Some(BoundingBox::new(a, b));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.range.is_none()
            && self.distance.is_none()
            && self.bounding_box.is_none()
    }

    /// The search body this query sends.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Evaluates every present predicate against `record`.
    ///
    /// Geographic predicates read the conventional location channel; a
    /// record without one never matches them.
    pub fn matches(&self, record: &RecordSet) -> bool {
        if let Some(from) = self.from {
            if record.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if record.timestamp > to {
                return false;
            }
        }
        if let Some(range) = &self.range {
            match record.number(&range.channel) {
                Some(value) if value >= range.min && value <= range.max => {}
                _ => return false,
            }
        }
        if let Some(distance) = &self.distance {
            match record.value(LOCATION_CHANNEL).and_then(ChannelValue::as_geo) {
                Some(point) if distance.center.distance_to(point) <= distance.radius_meters() => {}
                _ => return false,
            }
        }
        if let Some(bbox) = &self.bounding_box {
            match record.value(LOCATION_CHANNEL).and_then(ChannelValue::as_geo) {
                Some(point) if bbox.contains(point) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Search predicates over the device inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceQuery {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

impl DeviceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_bounding_box_corners_normalize(
            lon_a in -180.0f64..180.0,
            lat_a in -90.0f64..90.0,
            lon_b in -180.0f64..180.0,
            lat_b in -90.0f64..90.0,
        ) {
            let bbox = BoundingBox::new(
                GeoPoint::new(lon_a, lat_a),
                GeoPoint::new(lon_b, lat_b),
            );
            prop_assert!(bbox.sw.longitude <= bbox.ne.longitude);
            prop_assert!(bbox.sw.latitude <= bbox.ne.latitude);

            let midpoint = GeoPoint::new((lon_a + lon_b) / 2.0, (lat_a + lat_b) / 2.0);
            prop_assert!(bbox.contains(&midpoint));

            // The corners themselves sit on the border.
            prop_assert!(bbox.contains(&GeoPoint::new(lon_a, lat_a)));
            prop_assert!(bbox.contains(&GeoPoint::new(lon_b, lat_b)));
        }
    }
}
