/*
This file is part of the NTF Vector Toolkit
Copyright (C) 2022 Novel-T

The NTF Vector Toolkit is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use geo_types::{Coordinate, Rect};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::*;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    None,
}

pub fn geometry_type_to_name(geometry_type: GeometryType) -> &'static str {
    match geometry_type {
        GeometryType::Point => "Point",
        GeometryType::LineString => "Line String",
        GeometryType::Polygon => "Polygon",
        GeometryType::None => "None",
    }
}

/// Section-header coordinate transform.  Raw ordinates are unsigned integers
/// on a grid; real-world values are `raw * mult + origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordScale {
    pub mult: f64,
    pub x_origin: f64,
    pub y_origin: f64,
}

impl CoordScale {
    pub fn apply(&self, raw_x: i64, raw_y: i64) -> Coordinate<f64> {
        Coordinate {
            x: raw_x as f64 * self.mult + self.x_origin,
            y: raw_y as f64 * self.mult + self.y_origin,
        }
    }
}

/// Feature geometry.
///
/// A closed sum type; the variant of every feature matches the declared
/// geometry type of its layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate<f64>),
    LineString(Vec<Coordinate<f64>>),
    /// Rings of coordinates, exterior ring first, each ring closed.
    Polygon(Vec<Vec<Coordinate<f64>>>),
    None,
}

/// Ordinates that land on whole numbers print without a fractional part,
/// so grid data exports as e.g. `POINT (222904 127850)`.
fn format_ordinate(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn format_coords(coords: &[Coordinate<f64>]) -> String {
    coords
        .iter()
        .map(|c| format!("{} {}", format_ordinate(c.x), format_ordinate(c.y)))
        .join(",")
}

impl Geometry {
    /// Builds a geometry of the declared type from raw grid coordinate parts
    /// (one part per ring for polygons), applying the section scale.
    pub fn from_raw_parts(
        declared: GeometryType,
        parts: &[Vec<(i64, i64)>],
        scale: &CoordScale,
        fid: i64,
    ) -> Result<Geometry> {
        match declared {
            GeometryType::None => {
                // geometry records on a None class are rejected by the reader
                // before we get here
                Ok(Geometry::None)
            }
            GeometryType::Point => {
                if parts.len() != 1 || parts[0].len() != 1 {
                    Err(ErrorKind::InvalidGeometry {
                        fid,
                        msg: format!(
                            "point feature needs exactly one coordinate pair, found {} record(s) with {} pair(s)",
                            parts.len(),
                            parts.iter().map(|p| p.len()).sum::<usize>()
                        ),
                    })?;
                }
                let (x, y) = parts[0][0];
                Ok(Geometry::Point(scale.apply(x, y)))
            }
            GeometryType::LineString => {
                if parts.len() != 1 {
                    Err(ErrorKind::InvalidGeometry {
                        fid,
                        msg: format!("line feature needs exactly one geometry record, found {}", parts.len()),
                    })?;
                }
                if parts[0].len() < 2 {
                    Err(ErrorKind::InvalidGeometry {
                        fid,
                        msg: format!("line has fewer than two points ({})", parts[0].len()),
                    })?;
                }
                let coords = parts[0].iter().map(|&(x, y)| scale.apply(x, y)).collect();
                Ok(Geometry::LineString(coords))
            }
            GeometryType::Polygon => {
                if parts.is_empty() {
                    Err(ErrorKind::InvalidGeometry {
                        fid,
                        msg: "polygon feature without rings".to_string(),
                    })?;
                }
                let mut rings = Vec::with_capacity(parts.len());
                for ring in parts {
                    if ring.len() < 4 {
                        Err(ErrorKind::InvalidGeometry {
                            fid,
                            msg: format!("ring has fewer than four coordinate pairs ({})", ring.len()),
                        })?;
                    }
                    if ring.first() != ring.last() {
                        Err(ErrorKind::InvalidGeometry {
                            fid,
                            msg: "ring is not closed".to_string(),
                        })?;
                    }
                    rings.push(ring.iter().map(|&(x, y)| scale.apply(x, y)).collect());
                }
                Ok(Geometry::Polygon(rings))
            }
        }
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::None => GeometryType::None,
        }
    }

    pub fn geometry_name(&self) -> &'static str {
        geometry_type_to_name(self.geometry_type())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::LineString(coords) => coords.is_empty(),
            Geometry::Polygon(rings) => rings.is_empty(),
            Geometry::None => true,
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::LineString(coords) => coords.len(),
            Geometry::Polygon(rings) => rings.iter().map(|r| r.len()).sum(),
            Geometry::None => 0,
        }
    }

    /// Serialize the geometry as WKT.
    pub fn wkt(&self) -> String {
        match self {
            Geometry::Point(c) => format!(
                "POINT ({} {})",
                format_ordinate(c.x),
                format_ordinate(c.y)
            ),
            Geometry::LineString(coords) => {
                format!("LINESTRING ({})", format_coords(coords))
            }
            Geometry::Polygon(rings) => {
                format!(
                    "POLYGON ({})",
                    rings.iter().map(|r| format!("({})", format_coords(r))).join(",")
                )
            }
            Geometry::None => "GEOMETRYCOLLECTION EMPTY".to_string(),
        }
    }

    /// min/max bounding rectangle, `None` for empty geometry
    pub fn envelope(&self) -> Option<Rect<f64>> {
        let coords: Vec<&Coordinate<f64>> = match self {
            Geometry::Point(c) => vec![c],
            Geometry::LineString(coords) => coords.iter().collect(),
            Geometry::Polygon(rings) => rings.iter().flatten().collect(),
            Geometry::None => return None,
        };
        if coords.is_empty() {
            return None;
        }
        let min_x = coords.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
        let min_y = coords.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
        let max_x = coords.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = coords.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);
        Some(Rect::new(
            Coordinate { x: min_x, y: min_y },
            Coordinate { x: max_x, y: max_y },
        ))
    }

    /// Convert into the rust geo ecosystem types.
    pub fn to_geo(&self) -> Option<geo_types::Geometry<f64>> {
        match self {
            Geometry::Point(c) => Some(geo_types::Point(*c).into()),
            Geometry::LineString(coords) => {
                Some(geo_types::LineString(coords.clone()).into())
            }
            Geometry::Polygon(rings) => {
                let exterior = geo_types::LineString(rings.first()?.clone());
                let interiors = rings[1..]
                    .iter()
                    .map(|r| geo_types::LineString(r.clone()))
                    .collect();
                Some(geo_types::Polygon::new(exterior, interiors).into())
            }
            Geometry::None => None,
        }
    }
}
