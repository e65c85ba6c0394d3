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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Integer,
    Real,
    String,
}

pub fn field_type_to_name(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Integer => "Integer",
        FieldType::Real => "Real",
        FieldType::String => "String",
    }
}

impl FieldType {
    /// Widening when the same attribute shows different types across
    /// features: Integer -> Real -> String.
    pub(crate) fn widened(self, other: FieldType) -> FieldType {
        use FieldType::*;
        match (self, other) {
            (Integer, Integer) => Integer,
            (String, _) | (_, String) => String,
            _ => Real,
        }
    }
}

/// Definition of one attribute field of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    name: String,
    field_type: FieldType,
}

impl FieldDefinition {
    pub(crate) fn new(name: &str, field_type: FieldType) -> FieldDefinition {
        FieldDefinition {
            name: name.to_string(),
            field_type,
        }
    }

    pub(crate) fn widen(&mut self, other: FieldType) {
        self.field_type = self.field_type.widened(other);
    }

    /// Get the name of this field.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}
