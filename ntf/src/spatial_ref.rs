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
use serde::{Deserialize, Serialize};

/// Coordinate system descriptor, read from the spatial reference record.
///
/// Immutable after the dataset is opened; the dataset and its layers share one
/// instance by `Arc`, it is never deep-copied per layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpatialRef {
    projection: String,
    datum: String,
}

/// (semi-major axis, inverse flattening) for the datums the sample data uses.
fn spheroid_for_datum(datum: &str) -> (&'static str, f64, f64) {
    match datum {
        "OSGB 1936" => ("Airy 1830", 6377563.396, 299.3249646),
        _ => ("WGS 84", 6378137.0, 298.257223563),
    }
}

impl SpatialRef {
    pub fn new(projection: &str, datum: &str) -> SpatialRef {
        SpatialRef {
            projection: projection.to_string(),
            datum: datum.to_string(),
        }
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn datum(&self) -> &str {
        &self.datum
    }

    /// Export as an OGC WKT coordinate system string.
    pub fn to_wkt(&self) -> String {
        let (spheroid_name, semi_major, inv_flattening) = spheroid_for_datum(&self.datum);
        format!(
            "PROJCS[\"{}\",GEOGCS[\"{}\",DATUM[\"{}\",SPHEROID[\"{}\",{},{}]]],UNIT[\"metre\",1]]",
            self.projection,
            self.datum,
            self.datum.replace(' ', "_"),
            spheroid_name,
            semi_major,
            inv_flattening,
        )
    }
}
