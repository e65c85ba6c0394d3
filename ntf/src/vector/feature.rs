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

use crate::errors::*;
use crate::vector::field::FieldType;
use crate::vector::geometry::Geometry;
use anyhow::Result;

/// One feature: id, optional geometry, attribute fields in read order.
/// Owned by its layer; immutable once the dataset is open.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub(crate) fid: i64,
    pub(crate) geometry: Geometry,
    pub(crate) fields: Vec<(String, FieldValue)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    IntegerValue(i64),
    RealValue(f64),
    StringValue(String),
}

impl FieldValue {
    /// Parses an attribute value into the narrowest fitting type.
    pub(crate) fn parse(raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            if let Ok(i) = trimmed.parse::<i64>() {
                return FieldValue::IntegerValue(i);
            }
            if let Ok(r) = trimmed.parse::<f64>() {
                return FieldValue::RealValue(r);
            }
        }
        FieldValue::StringValue(trimmed.to_string())
    }

    pub(crate) fn field_type(&self) -> FieldType {
        match self {
            FieldValue::IntegerValue(_) => FieldType::Integer,
            FieldValue::RealValue(_) => FieldType::Real,
            FieldValue::StringValue(_) => FieldType::String,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            FieldValue::StringValue(rv) => Some(rv),
            _ => None,
        }
    }

    pub fn to_real(&self) -> Option<f64> {
        match self {
            FieldValue::IntegerValue(rv) => Some(*rv as f64),
            FieldValue::RealValue(rv) => Some(*rv),
            FieldValue::StringValue(_) => None,
        }
    }

    pub fn to_int(&self) -> Option<i64> {
        match self {
            FieldValue::IntegerValue(rv) => Some(*rv),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FieldValue::IntegerValue(rv) => write!(f, "{}", rv),
            FieldValue::RealValue(rv) => write!(f, "{}", rv),
            FieldValue::StringValue(rv) => write!(f, "{}", rv),
        }
    }
}

impl Feature {
    pub fn fid(&self) -> i64 {
        self.fid
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Get the value of a named field.  If the field exists, it returns a
    /// `FieldValue` wrapper, that you need to unpack to a base type
    /// (string, float, etc).
    pub fn field(&self, name: &str) -> Result<FieldValue> {
        match self.fields.iter().find(|(n, _)| n == name) {
            Some((_, value)) => Ok(value.clone()),
            None => Err(ErrorKind::InvalidFieldName {
                field_name: name.to_string(),
                method_name: "Feature::field",
            })?,
        }
    }

    /// Iterate over (name, value) pairs in read order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}
