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
//! NTF Vector Data
//!

pub use crate::vector::dataset::{Dataset, ReadOptions, Strictness};
pub use crate::vector::feature::{Feature, FieldValue};
pub use crate::vector::field::{field_type_to_name, FieldDefinition, FieldType};
pub use crate::vector::geometry::{geometry_type_to_name, CoordScale, Geometry, GeometryType};
pub use crate::vector::layer::{FeatureIterator, Layer};
pub use crate::vector::layer_definition::{FieldIterator, LayerDefinition};
pub use crate::vector::reader::{FEATURE_CLASSES_LAYER_NAME, SUPPORTED_FORMAT_VERSION};

mod dataset;
mod feature;
mod field;
mod geometry;
mod layer;
mod layer_definition;
mod reader;

#[cfg(test)]
mod tests;
