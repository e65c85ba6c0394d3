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
use crate::vector::field::{FieldDefinition, FieldType};
use crate::vector::geometry::GeometryType;

/// Schema of a layer: declared geometry type plus the attribute fields seen
/// across its features, in first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDefinition {
    geometry_type: GeometryType,
    fields: Vec<FieldDefinition>,
}

impl LayerDefinition {
    pub(crate) fn new(geometry_type: GeometryType) -> LayerDefinition {
        LayerDefinition {
            geometry_type,
            fields: Vec::new(),
        }
    }

    /// Registers an attribute occurrence, widening the field type if the same
    /// name was seen before with a different type.
    pub(crate) fn note_field(&mut self, name: &str, field_type: FieldType) {
        match self.fields.iter_mut().find(|f| f.name() == name) {
            Some(existing) => existing.widen(field_type),
            None => self.fields.push(FieldDefinition::new(name, field_type)),
        }
    }

    pub fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn fields(&self) -> FieldIterator {
        FieldIterator {
            defn: self,
            next_id: 0,
        }
    }
}

pub struct FieldIterator<'d> {
    defn: &'d LayerDefinition,
    next_id: usize,
}

impl<'d> Iterator for FieldIterator<'d> {
    type Item = &'d FieldDefinition;

    #[inline]
    fn next(&mut self) -> Option<&'d FieldDefinition> {
        if self.next_id == self.defn.fields.len() {
            return None;
        }
        let field = &self.defn.fields[self.next_id];
        self.next_id += 1;
        Some(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_field_keeps_order_and_widens() {
        let mut defn = LayerDefinition::new(GeometryType::Point);
        defn.note_field("HT", FieldType::Integer);
        defn.note_field("NM", FieldType::String);
        defn.note_field("HT", FieldType::Real);

        assert_eq!(defn.field_count(), 2);
        let names: Vec<&str> = defn.fields().map(|f| f.name()).collect();
        assert_eq!(names, vec!["HT", "NM"]);
        assert_eq!(defn.field("HT").unwrap().field_type(), FieldType::Real);
        assert_eq!(defn.field("XX"), None);
    }
}
