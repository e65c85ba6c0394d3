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
use std::sync::Arc;

use crate::errors::*;
use crate::spatial_ref::SpatialRef;
use crate::vector::feature::Feature;
use crate::vector::layer_definition::LayerDefinition;
use anyhow::Result;

/// Layer in a vector dataset.  Name is unique within the dataset; the feature
/// sequence is fixed once the dataset is fully read.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub(crate) name: String,
    pub(crate) defn: LayerDefinition,
    pub(crate) spatial_ref: Option<Arc<SpatialRef>>,
    pub(crate) features: Vec<Feature>,
}

impl Layer {
    /// Get the name of this layer.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer_definition(&self) -> &LayerDefinition {
        &self.defn
    }

    pub fn count(&self) -> i64 {
        self.features.len() as i64
    }

    /// Iterate over all features in this layer.  Each call starts a fresh
    /// iterator; the order is always read order.
    pub fn features(&self) -> FeatureIterator {
        FeatureIterator::_with_layer(self)
    }

    pub fn get_feature_by_id(&self, fid: i64) -> Result<&Feature> {
        match self.features.iter().find(|f| f.fid == fid) {
            Some(feature) => Ok(feature),
            None => Err(ErrorKind::NotFound {
                name: fid.to_string(),
                method_name: "Layer::get_feature_by_id",
            })?,
        }
    }

    /// The shared coordinate system, `NotFound` for attribute-only layers.
    pub fn spatial_reference(&self) -> Result<&SpatialRef> {
        match &self.spatial_ref {
            Some(srs) => Ok(srs),
            None => Err(ErrorKind::NotFound {
                name: self.name.clone(),
                method_name: "Layer::spatial_reference",
            })?,
        }
    }
}

/// Explicit cursor into a layer's feature sequence; supports `reset`.
pub struct FeatureIterator<'l> {
    layer: &'l Layer,
    next_idx: usize,
}

impl<'l> Iterator for FeatureIterator<'l> {
    type Item = &'l Feature;

    #[inline]
    fn next(&mut self) -> Option<&'l Feature> {
        if self.next_idx == self.layer.features.len() {
            return None;
        }
        let feature = &self.layer.features[self.next_idx];
        self.next_idx += 1;
        Some(feature)
    }
}

impl<'l> FeatureIterator<'l> {
    pub fn _with_layer(layer: &'l Layer) -> FeatureIterator<'l> {
        FeatureIterator {
            layer,
            next_idx: 0,
        }
    }

    /// Rewind to the first feature.
    pub fn reset(&mut self) {
        self.next_idx = 0;
    }
}
