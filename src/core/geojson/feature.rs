//! GeoJSON document types and spatial value parsing
//!
//! Spatial values are `;`-separated points, each `lat lon [alt [accuracy]]`.
//! GeoJSON positions are written `[lon, lat, alt?]`; accuracy is dropped.

use crate::domain::ValueKind;
use serde::Serialize;

/// A parsed point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

impl Point {
    /// Parses `lat lon [alt [accuracy]]`
    ///
    /// Returns `None` for fewer than two components, non-numeric or
    /// non-finite components, or coordinates out of range.
    pub fn parse(token: &str) -> Option<Self> {
        let components = token
            .split_whitespace()
            .take(4)
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        if components.iter().take(3).any(|c| !c.is_finite()) {
            return None;
        }

        let (latitude, longitude) = match components.as_slice() {
            [lat, lon, ..] => (*lat, *lon),
            _ => return None,
        };
        if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
            return None;
        }

        Some(Self {
            latitude,
            longitude,
            altitude: components.get(2).copied(),
        })
    }

    /// GeoJSON position
    pub fn position(&self) -> Vec<f64> {
        let mut position = vec![self.longitude, self.latitude];
        position.extend(self.altitude);
        position
    }
}

/// Parses every valid point of a raw value, skipping invalid ones
pub fn parse_points(raw: &str) -> Vec<Point> {
    raw.split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(Point::parse)
        .collect()
}

/// GeoJSON geometry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
}

impl Geometry {
    /// Builds the geometry of a spatial field value
    ///
    /// A geopoint needs exactly one point, a geotrace at least two, and a
    /// geoshape at least four with the first and last point identical.
    pub fn from_value(kind: ValueKind, raw: &str) -> Option<Self> {
        let points = parse_points(raw);
        let positions = || points.iter().map(Point::position).collect::<Vec<_>>();

        match kind {
            ValueKind::Geopoint if points.len() == 1 => Some(Self::Point {
                coordinates: points[0].position(),
            }),
            ValueKind::Geotrace if points.len() >= 2 => Some(Self::LineString {
                coordinates: positions(),
            }),
            ValueKind::Geoshape if points.len() >= 4 && points.first() == points.last() => {
                Some(Self::Polygon {
                    coordinates: vec![positions()],
                })
            }
            _ => None,
        }
    }
}

/// Properties attached to every feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProperties {
    /// KEY of the row the value belongs to
    pub key: String,
    /// FQN of the spatial field
    pub field: String,
    /// `yes` when the value was empty or absent
    pub empty: &'static str,
    /// `yes` when a geometry was built
    pub valid: &'static str,
}

/// A GeoJSON feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    /// `None` for empty or invalid values
    pub geometry: Option<Geometry>,
    pub properties: FeatureProperties,
}

impl Feature {
    /// Builds the feature for one field value
    pub fn from_value(
        kind: ValueKind,
        raw: Option<&str>,
        key: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        let raw = raw.map(str::trim).unwrap_or_default();
        let (geometry, empty) = if raw.is_empty() {
            (None, true)
        } else {
            (Geometry::from_value(kind, raw), false)
        };
        let valid = geometry.is_some();

        Self {
            kind: "Feature",
            geometry,
            properties: FeatureProperties {
                key: key.into(),
                field: field.into(),
                empty: yes_no(empty),
                valid: yes_no(valid),
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        self.geometry.is_some()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// A GeoJSON document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}
