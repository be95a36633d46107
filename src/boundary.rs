//! Administrative boundary geometry.
//!
//! Boundaries arrive as GeoJSON (longitude first) and are held as a
//! `geo::MultiPolygon` so single and multi-part districts share one code path.

use geo::{BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon, Rect};
use serde::Deserialize;

use crate::error::{PrepError, Result};
use crate::types::Coordinates;

/// A named region used to filter points
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub name: String,
    pub polygon: MultiPolygon<f64>,
}

impl Boundary {
    pub fn new(name: impl Into<String>, polygon: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            polygon,
        }
    }

    /// Strict containment: points on the boundary edge are outside.
    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        self.polygon.contains(point)
    }

    pub fn contains(&self, coordinates: Coordinates) -> bool {
        self.contains_point(&Point::new(coordinates.lon, coordinates.lat))
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.polygon.bounding_rect()
    }
}

/// GeoJSON geometry object as returned by map services
#[derive(Debug, Clone, Deserialize)]
pub struct GeoJsonGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

type Position = Vec<f64>;
type Ring = Vec<Position>;

impl GeoJsonGeometry {
    pub fn is_areal(&self) -> bool {
        matches!(self.kind.as_str(), "Polygon" | "MultiPolygon")
    }

    pub fn to_multi_polygon(&self) -> Result<MultiPolygon<f64>> {
        match self.kind.as_str() {
            "Polygon" => {
                let rings: Vec<Ring> = serde_json::from_value(self.coordinates.clone())?;
                Ok(MultiPolygon::new(vec![polygon_from_rings(rings)?]))
            }
            "MultiPolygon" => {
                let polygons: Vec<Vec<Ring>> = serde_json::from_value(self.coordinates.clone())?;
                let polygons = polygons
                    .into_iter()
                    .map(polygon_from_rings)
                    .collect::<Result<Vec<_>>>()?;
                Ok(MultiPolygon::new(polygons))
            }
            other => Err(PrepError::Boundary {
                message: format!("geometry type '{}' is not a polygon", other),
            }),
        }
    }
}

fn polygon_from_rings(rings: Vec<Ring>) -> Result<Polygon<f64>> {
    let mut rings = rings
        .into_iter()
        .map(line_string)
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let exterior = rings.next().ok_or_else(|| PrepError::Boundary {
        message: "polygon has no exterior ring".to_string(),
    })?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn line_string(ring: Ring) -> Result<LineString<f64>> {
    ring.into_iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(PrepError::Boundary {
                message: format!("invalid position {:?}", position),
            }),
        })
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}
