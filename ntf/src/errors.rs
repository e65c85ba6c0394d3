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
use thiserror::Error;


#[derive(Clone, PartialEq, Debug, Error)]
pub enum ErrorKind {
    #[error("Cannot open '{}': {}", source_name, msg)]
    OpenError {
        source_name: String,
        msg: String,
    },
    #[error("Volume header declares format version '{}', only '0200' is supported", found)]
    UnsupportedVersion {
        found: String,
    },
    #[error("First record is not a volume header (record type 01)")]
    MissingHeader,
    #[error("Malformed record at line {}: {}", line, msg)]
    MalformedRecord {
        line: usize,
        msg: String,
    },
    #[error("Invalid geometry on feature {}: {}", fid, msg)]
    InvalidGeometry {
        fid: i64,
        msg: String,
    },
    #[error("Schema conflict on layer '{}': {}", layer_name, msg)]
    SchemaConflict {
        layer_name: String,
        msg: String,
    },
    #[error("'{}' not found on method {}", name, method_name)]
    NotFound {
        name: String,
        method_name: &'static str,
    },
    #[error(
        "Invalid field name '{}' used on method {}",
        field_name, method_name
    )]
    InvalidFieldName {
        field_name: String,
        method_name: &'static str,
    },
}
