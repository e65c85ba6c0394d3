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
use std::fs;
use std::io;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::*;
use crate::spatial_ref::SpatialRef;
use crate::vector::layer::Layer;
use crate::vector::reader;
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Any malformed record or invalid geometry aborts the open.
    Strict,
    /// Malformed records and invalid geometries are skipped with a warning.
    /// Schema conflicts stay fatal.
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    pub strictness: Strictness,
}

impl Default for ReadOptions {
    fn default() -> ReadOptions {
        ReadOptions {
            strictness: Strictness::Strict,
        }
    }
}

/// Vector dataset.
///
/// Fully materialized by `open`; read-only afterward, so one opened dataset
/// can be shared freely between readers.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub(crate) name: String,
    pub(crate) creation_date: Option<NaiveDate>,
    pub(crate) spatial_ref: Option<Arc<SpatialRef>>,
    pub(crate) layers: Vec<Layer>,
}

impl Dataset {
    /// Open the dataset in strict mode.
    pub fn open<P>(path: P) -> Result<Dataset>
    where
        P: AsRef<Path>,
    {
        Dataset::open_with(path, ReadOptions::default())
    }

    pub fn open_with<P>(path: P, options: ReadOptions) -> Result<Dataset>
    where
        P: AsRef<Path>,
    {
        let source_name = path.as_ref().display().to_string();
        let f = fs::File::open(path.as_ref()).map_err(|err| ErrorKind::OpenError {
            source_name: source_name.clone(),
            msg: err.to_string(),
        })?;
        Dataset::from_reader(&source_name, io::BufReader::new(f), options)
    }

    /// Read from any buffered stream.  `source_name` only labels errors and
    /// serves as the fallback dataset name.
    pub fn from_reader<R>(source_name: &str, src: R, options: ReadOptions) -> Result<Dataset>
    where
        R: BufRead,
    {
        reader::read_dataset(source_name, src, options)
    }

    /// Get number of layers.
    pub fn count(&self) -> isize {
        self.layers.len() as isize
    }

    /// Get layer number `idx`.
    pub fn layer(&self, idx: isize) -> Result<&Layer> {
        if idx < 0 || idx as usize >= self.layers.len() {
            Err(ErrorKind::NotFound {
                name: idx.to_string(),
                method_name: "Dataset::layer",
            })?;
        }
        Ok(&self.layers[idx as usize])
    }

    /// Get layer with `name`.
    pub fn layer_by_name(&self, name: &str) -> Result<&Layer> {
        match self.layers.iter().find(|l| l.name() == name) {
            Some(layer) => Ok(layer),
            None => Err(ErrorKind::NotFound {
                name: name.to_string(),
                method_name: "Dataset::layer_by_name",
            })?,
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Dataset name: database header if present, volume name otherwise,
    /// source name as a last resort.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn creation_date(&self) -> Option<NaiveDate> {
        self.creation_date
    }

    /// The coordinate system shared by every geometry-bearing layer.
    pub fn spatial_reference(&self) -> Result<&SpatialRef> {
        match &self.spatial_ref {
            Some(srs) => Ok(srs),
            None => Err(ErrorKind::NotFound {
                name: self.name.clone(),
                method_name: "Dataset::spatial_reference",
            })?,
        }
    }
}
