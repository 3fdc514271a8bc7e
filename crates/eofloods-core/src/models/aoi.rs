//! Area of interest as a geographic bounding box.

use crate::error::{FloodError, Result};
use geo::{coord, Centroid, Intersects, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bounding box in WGS 84 (EPSG:4326) degrees, `[xmin, ymin, xmax, ymax]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl BoundingBox {
    /// Create a validated bounding box
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        if [xmin, ymin, xmax, ymax].iter().any(|v| !v.is_finite()) {
            return Err(FloodError::InvalidBoundingBox {
                reason: "coordinates must be finite".to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&xmin) || !(-180.0..=180.0).contains(&xmax) {
            return Err(FloodError::LongitudeOutOfRange { xmin, xmax });
        }
        if !(-90.0..=90.0).contains(&ymin) || !(-90.0..=90.0).contains(&ymax) {
            return Err(FloodError::LatitudeOutOfRange { ymin, ymax });
        }
        if xmin > xmax || ymin > ymax {
            return Err(FloodError::InvalidBoundingBox {
                reason: format!(
                    "minimum corner ({}, {}) must not exceed maximum corner ({}, {})",
                    xmin, ymin, xmax, ymax
                ),
            });
        }
        Ok(Self { xmin, ymin, xmax, ymax })
    }

    /// Create from a `[xmin, ymin, xmax, ymax]` slice
    pub fn from_slice(coords: &[f64]) -> Result<Self> {
        match coords {
            [xmin, ymin, xmax, ymax] => Self::new(*xmin, *ymin, *xmax, *ymax),
            _ => Err(FloodError::InvalidBoundingBox {
                reason: format!("expected 4 coordinates [xmin, ymin, xmax, ymax], got {}", coords.len()),
            }),
        }
    }

    /// The whole globe
    pub fn global() -> Self {
        Self { xmin: -180.0, ymin: -90.0, xmax: 180.0, ymax: 90.0 }
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Coordinates as `[xmin, ymin, xmax, ymax]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }

    /// Closed exterior ring, counter-clockwise from the lower-left corner
    pub fn ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.xmin, self.ymin],
            [self.xmax, self.ymin],
            [self.xmax, self.ymax],
            [self.xmin, self.ymax],
            [self.xmin, self.ymin],
        ]
    }

    /// Centroid as `(latitude, longitude)`, the order map widgets expect
    pub fn centroid(&self) -> (f64, f64) {
        let center = self.to_rect().centroid();
        (center.y(), center.x())
    }

    /// Whether two boxes share any area or boundary
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.to_rect().intersects(&other.to_rect())
    }

    /// Leaflet-style bounds `[[south, west], [north, east]]`
    pub fn leaflet_bounds(&self) -> [[f64; 2]; 2] {
        [[self.ymin, self.xmin], [self.ymax, self.xmax]]
    }

    /// GeoJSON polygon geometry of the box
    pub fn to_geojson(&self) -> geojson::Geometry {
        let ring = self.ring().iter().map(|c| c.to_vec()).collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))
    }

    fn to_rect(self) -> Rect<f64> {
        Rect::new(coord! { x: self.xmin, y: self.ymin }, coord! { x: self.xmax, y: self.ymax })
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = FloodError;

    fn try_from(value: [f64; 4]) -> Result<Self> {
        Self::from_slice(&value)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(value: BoundingBox) -> Self {
        value.to_array()
    }
}

impl FromStr for BoundingBox {
    type Err = FloodError;

    /// Parse `"xmin,ymin,xmax,ymax"`
    fn from_str(s: &str) -> Result<Self> {
        let coords = s
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| FloodError::InvalidBoundingBox {
                    reason: format!("'{}' is not a number", part.trim()),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::from_slice(&coords)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.xmin, self.ymin, self.xmax, self.ymax)
    }
}
