//! Vector feature types consumed by the analysis pipeline

use crate::error::{Error, Result};
use geo_types::{Coord, Geometry, LineString};

/// A geographic feature wrapping a `geo-types` geometry.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Geometry<f64>,
    /// Optional feature ID
    pub id: Option<u64>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: geometry.into(),
            id: None,
        }
    }

    /// Create a feature with an explicit ID
    pub fn with_id(geometry: impl Into<Geometry<f64>>, id: u64) -> Self {
        Self {
            geometry: geometry.into(),
            id: Some(id),
        }
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

/// Human-readable name of a geometry variant, for error messages.
pub fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "point",
        Geometry::Line(_) => "line",
        Geometry::LineString(_) => "polyline",
        Geometry::Polygon(_) => "polygon",
        Geometry::MultiPoint(_) => "multipoint",
        Geometry::MultiLineString(_) => "polyline",
        Geometry::MultiPolygon(_) => "polygon",
        Geometry::GeometryCollection(_) => "geometry collection",
        Geometry::Rect(_) => "rectangle",
        Geometry::Triangle(_) => "triangle",
    }
}

/// Extract the polyline parts of a geometry.
///
/// A `LineString` is a single part; a `MultiLineString` contributes one part
/// per member. Any other base type is a [`Error::BadInputShape`].
pub fn polyline_parts(geometry: &Geometry<f64>) -> Result<Vec<&LineString<f64>>> {
    match geometry {
        Geometry::LineString(ls) => Ok(vec![ls]),
        Geometry::MultiLineString(mls) => Ok(mls.0.iter().collect()),
        other => Err(Error::BadInputShape {
            expected: "polyline",
            found: geometry_kind(other),
        }),
    }
}

/// Extract every ring vertex of a polygon geometry.
///
/// Exterior and interior rings both contribute; any non-polygon base type is
/// a [`Error::BadInputShape`].
pub fn polygon_vertices(geometry: &Geometry<f64>) -> Result<Vec<Coord<f64>>> {
    let mut vertices = Vec::new();
    let mut push_polygon = |polygon: &geo_types::Polygon<f64>| {
        vertices.extend(polygon.exterior().0.iter().copied());
        for ring in polygon.interiors() {
            vertices.extend(ring.0.iter().copied());
        }
    };

    match geometry {
        Geometry::Polygon(p) => push_polygon(p),
        Geometry::MultiPolygon(mp) => {
            for p in &mp.0 {
                push_polygon(p);
            }
        }
        other => {
            return Err(Error::BadInputShape {
                expected: "polygon",
                found: geometry_kind(other),
            })
        }
    }

    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, polygon, MultiLineString, Point};

    #[test]
    fn polyline_parts_of_linestring() {
        let ls = line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0)];
        let geom = Geometry::LineString(ls);
        let parts = polyline_parts(&geom).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].0.len(), 2);
    }

    #[test]
    fn polyline_parts_of_multilinestring() {
        let mls = MultiLineString::new(vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
            line_string![(x: 2.0, y: 0.0), (x: 3.0, y: 0.0)],
        ]);
        let geom = Geometry::MultiLineString(mls);
        let parts = polyline_parts(&geom).unwrap();
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn polyline_parts_rejects_points() {
        let err = polyline_parts(&Geometry::Point(Point::new(0.0, 0.0))).unwrap_err();
        assert!(matches!(
            err,
            Error::BadInputShape {
                expected: "polyline",
                ..
            }
        ));
    }

    #[test]
    fn polygon_vertices_include_interior_rings() {
        let poly = polygon!(
            exterior: [
                (x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0),
            ],
            interiors: [[
                (x: 4.0, y: 4.0), (x: 6.0, y: 4.0), (x: 6.0, y: 6.0), (x: 4.0, y: 6.0),
            ]],
        );
        let vertices = polygon_vertices(&Geometry::Polygon(poly)).unwrap();
        // both rings are closed by the macro, 5 vertices each
        assert_eq!(vertices.len(), 10);
    }

    #[test]
    fn polygon_vertices_reject_polylines() {
        let ls = line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 5.0)];
        assert!(polygon_vertices(&Geometry::LineString(ls)).is_err());
    }
}
