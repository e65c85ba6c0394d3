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
//! The single read pass behind `Dataset::open`: walks the record stream,
//! builds geometries against the current section scale, and assembles
//! completed features into layers keyed by their feature class.

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, warn};

use crate::errors::*;
use crate::record::*;
use crate::spatial_ref::SpatialRef;
use crate::utils::{_decimal, _digits, _slice};
use crate::vector::dataset::{Dataset, ReadOptions, Strictness};
use crate::vector::feature::{Feature, FieldValue};
use crate::vector::geometry::{CoordScale, Geometry, GeometryType};
use crate::vector::layer::Layer;
use crate::vector::layer_definition::LayerDefinition;
use anyhow::Result;

/// Synthetic attribute-only layer listing the declared feature classes.
pub const FEATURE_CLASSES_LAYER_NAME: &str = "FEATURE_CLASSES";

pub const SUPPORTED_FORMAT_VERSION: &str = "0200";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    Point,
    Line,
    Area,
    Text,
    None,
}

impl ClassKind {
    fn from_char(c: char) -> Option<ClassKind> {
        match c {
            'P' => Some(ClassKind::Point),
            'L' => Some(ClassKind::Line),
            'A' => Some(ClassKind::Area),
            'T' => Some(ClassKind::Text),
            'N' => Some(ClassKind::None),
            _ => None,
        }
    }

    /// Text features anchor at a point.
    fn geometry_type(self) -> GeometryType {
        match self {
            ClassKind::Point | ClassKind::Text => GeometryType::Point,
            ClassKind::Line => GeometryType::LineString,
            ClassKind::Area => GeometryType::Polygon,
            ClassKind::None => GeometryType::None,
        }
    }
}

#[derive(Debug, Clone)]
struct FeatureClass {
    code: i64,
    kind: ClassKind,
    name: String,
}

/// Feature currently being assembled: subsequent geometry and attribute
/// records attach here until the next feature start record.
struct PendingFeature {
    fid: i64,
    class_code: i64,
    line: usize,
    text: Option<String>,
    parts: Vec<Vec<(i64, i64)>>,
    fields: Vec<(String, FieldValue)>,
}

struct NtfReader<R: BufRead> {
    source_name: String,
    records: RecordReader<R>,
    options: ReadOptions,

    volume_name: Option<String>,
    db_name: Option<String>,
    creation_date: Option<NaiveDate>,
    spatial_ref: Option<Arc<SpatialRef>>,

    xylen: usize,
    scale: Option<CoordScale>,

    classes: Vec<FeatureClass>,
    layers: Vec<Layer>,
    layer_idx_by_name: HashMap<String, usize>,

    pending: Option<PendingFeature>,
    n_features: usize,
    n_skipped: usize,
}

pub(crate) fn read_dataset<R: BufRead>(
    source_name: &str,
    src: R,
    options: ReadOptions,
) -> Result<Dataset> {
    let mut reader = NtfReader {
        source_name: source_name.to_string(),
        records: RecordReader::new(src),
        options,
        volume_name: None,
        db_name: None,
        creation_date: None,
        spatial_ref: None,
        xylen: 0,
        scale: None,
        classes: Vec::new(),
        layers: Vec::new(),
        layer_idx_by_name: HashMap::new(),
        pending: None,
        n_features: 0,
        n_skipped: 0,
    };
    reader.read_volume_header()?;
    reader.read_records()?;
    Ok(reader.build())
}

impl<R: BufRead> NtfReader<R> {
    /// A recoverable error is skipped in lenient mode; in strict mode it
    /// aborts the open with a single summarizing `OpenError`.
    fn recover(&mut self, err: anyhow::Error) -> Result<()> {
        let recoverable = matches!(
            err.downcast_ref::<ErrorKind>(),
            Some(ErrorKind::MalformedRecord { .. }) | Some(ErrorKind::InvalidGeometry { .. })
        );
        if !recoverable {
            // schema conflicts and I/O failures are fatal in both modes
            return match err.downcast_ref::<ErrorKind>() {
                Some(_) => Err(err),
                None => Err(ErrorKind::OpenError {
                    source_name: self.source_name.clone(),
                    msg: err.to_string(),
                }
                .into()),
            };
        }
        match self.options.strictness {
            Strictness::Lenient => {
                warn!("{}: skipped: {}", self.source_name, err);
                self.n_skipped += 1;
                Ok(())
            }
            Strictness::Strict => Err(ErrorKind::OpenError {
                source_name: self.source_name.clone(),
                msg: err.to_string(),
            }
            .into()),
        }
    }

    /// The volume header must be the very first record; it carries the volume
    /// name, the format version and optionally the creation date.
    fn read_volume_header(&mut self) -> Result<()> {
        let record = match self.records.next() {
            None => Err(ErrorKind::MissingHeader)?,
            // a malformed first line means no header; an I/O failure does not
            Some(Err(err)) => match err.downcast_ref::<ErrorKind>() {
                Some(_) => Err(ErrorKind::MissingHeader)?,
                None => Err(ErrorKind::OpenError {
                    source_name: self.source_name.clone(),
                    msg: err.to_string(),
                })?,
            },
            Some(Ok(record)) => record,
        };
        if record.rec_type != REC_VOLHDREC {
            Err(ErrorKind::MissingHeader)?;
        }

        let name = _slice(&record.payload, record.line, 0, 20, "volume name")
            .map_err(|_| ErrorKind::MissingHeader)?
            .trim()
            .to_string();
        let version = _slice(&record.payload, record.line, 20, 4, "format version")
            .map_err(|_| ErrorKind::MissingHeader)?
            .to_string();
        if version != SUPPORTED_FORMAT_VERSION {
            Err(ErrorKind::UnsupportedVersion { found: version })?;
        }

        if record.payload.len() >= 32 {
            let date = &record.payload[24..32];
            self.creation_date = parse_yyyymmdd(date);
            if self.creation_date.is_none() {
                warn!(
                    "{}: unparsable creation date '{}' in volume header",
                    self.source_name, date
                );
            }
        }

        self.volume_name = Some(name);
        Ok(())
    }

    fn read_records(&mut self) -> Result<()> {
        let mut terminated = false;

        while let Some(record) = self.records.next() {
            let record = match record {
                Err(err) => {
                    self.recover(err)?;
                    continue;
                }
                Ok(record) => record,
            };

            let result = match record.rec_type {
                REC_DBHREC => {
                    self.db_name = Some(record.payload.trim().to_string());
                    Ok(())
                }
                REC_FEATCLASS => self.declare_class(&record),
                REC_SECHREC => {
                    // section boundary also closes any feature in progress;
                    // a failure there must not take this record down with it
                    if let Err(err) = self.finish_pending() {
                        self.recover(err)?;
                    }
                    self.read_section_header(&record)
                }
                REC_SPATREF => self.read_spatial_ref(&record),
                REC_ATTREC => self.read_attributes(&record),
                REC_POINTREC | REC_NODEREC | REC_LINEREC | REC_POLYREC | REC_TEXTREC => {
                    if let Err(err) = self.finish_pending() {
                        self.recover(err)?;
                    }
                    self.start_feature(&record)
                }
                REC_GEOMETRY => self.read_geometry(&record),
                REC_VOLTERM => {
                    terminated = true;
                    Ok(())
                }
                other => Err(ErrorKind::MalformedRecord {
                    line: record.line,
                    msg: format!("unknown record type {:02}", other),
                }
                .into()),
            };
            if let Err(err) = result {
                self.recover(err)?;
            }
            if terminated {
                break;
            }
        }

        if !terminated && self.options.strictness == Strictness::Strict {
            Err(ErrorKind::OpenError {
                source_name: self.source_name.clone(),
                msg: "volume terminator record (99) missing".to_string(),
            })?;
        }
        if !terminated {
            warn!("{}: volume terminator record (99) missing", self.source_name);
        }

        if let Err(err) = self.finish_pending() {
            self.recover(err)?;
        }

        debug!(
            "{}: read {} features into {} layers ({} classes declared, {} skipped)",
            self.source_name,
            self.n_features,
            self.layers.len(),
            self.classes.len(),
            self.n_skipped
        );
        Ok(())
    }

    fn declare_class(&mut self, record: &RawRecord) -> Result<()> {
        let code = _digits(&record.payload, record.line, 0, 4, "class code")?;
        let kind_char = _slice(&record.payload, record.line, 4, 1, "geometry kind")?
            .chars()
            .next()
            .unwrap();
        let kind = ClassKind::from_char(kind_char).ok_or(ErrorKind::MalformedRecord {
            line: record.line,
            msg: format!("unknown geometry kind '{}'", kind_char),
        })?;
        let name = record.payload[5..].trim().to_string();
        if name.is_empty() {
            Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: "feature class without a name".to_string(),
            })?;
        }

        if let Some(existing) = self.classes.iter().find(|c| c.code == code) {
            if existing.kind != kind || existing.name != name {
                Err(ErrorKind::SchemaConflict {
                    layer_name: name,
                    msg: format!("class code {:04} redeclared with a different schema", code),
                })?;
            }
            return Ok(());
        }
        if let Some(same_name) = self.classes.iter().find(|c| c.name == name) {
            if same_name.kind != kind {
                Err(ErrorKind::SchemaConflict {
                    layer_name: name.clone(),
                    msg: format!(
                        "classes {:04} and {:04} share the layer name but declare different geometry types",
                        same_name.code, code
                    ),
                })?;
            }
        }
        self.classes.push(FeatureClass { code, kind, name });
        Ok(())
    }

    fn read_section_header(&mut self, record: &RawRecord) -> Result<()> {
        let xylen = _digits(&record.payload, record.line, 0, 2, "ordinate width")?;
        if xylen < 1 || xylen > 10 {
            Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: format!("ordinate width {} out of range 1-10", xylen),
            })?;
        }
        let mult = _decimal(&record.payload, record.line, 2, 10, "coordinate multiplier")?;
        let x_origin = _decimal(&record.payload, record.line, 12, 10, "x origin")?;
        let y_origin = _decimal(&record.payload, record.line, 22, 10, "y origin")?;

        self.xylen = xylen as usize;
        self.scale = Some(CoordScale {
            mult,
            x_origin,
            y_origin,
        });
        debug!(
            "{}: section header: width {}, mult {}, origin ({}, {})",
            self.source_name, xylen, mult, x_origin, y_origin
        );
        Ok(())
    }

    fn read_spatial_ref(&mut self, record: &RawRecord) -> Result<()> {
        let mut parts = record.payload.splitn(2, '\\');
        let projection = parts.next().unwrap_or("").trim();
        let datum = parts.next().unwrap_or("").trim();
        if projection.is_empty() || datum.is_empty() {
            Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: "spatial reference record needs 'projection\\datum'".to_string(),
            })?;
        }
        let srs = SpatialRef::new(projection, datum);
        match &self.spatial_ref {
            None => {
                self.spatial_ref = Some(Arc::new(srs));
            }
            Some(existing) if **existing == srs => {}
            Some(_) => Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: "conflicting spatial reference record".to_string(),
            })?,
        }
        Ok(())
    }

    fn start_feature(&mut self, record: &RawRecord) -> Result<()> {
        let fid = _digits(&record.payload, record.line, 0, 6, "feature id")?;
        let class_code = _digits(&record.payload, record.line, 6, 4, "class code")?;

        let class = match self.classes.iter().find(|c| c.code == class_code) {
            Some(class) => class,
            None => Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: format!("feature {} references undeclared class {:04}", fid, class_code),
            })?,
        };

        // the record type must agree with the class declaration
        let expected = match record.rec_type {
            REC_POINTREC => ClassKind::Point,
            REC_NODEREC => ClassKind::None,
            REC_LINEREC => ClassKind::Line,
            REC_POLYREC => ClassKind::Area,
            REC_TEXTREC => ClassKind::Text,
            _ => unreachable!(),
        };
        if class.kind != expected {
            Err(ErrorKind::SchemaConflict {
                layer_name: class.name.clone(),
                msg: format!(
                    "feature {} uses record type {:02} on a class declared as {:?}",
                    fid, record.rec_type, class.kind
                ),
            })?;
        }

        let text = if record.rec_type == REC_TEXTREC {
            Some(record.payload.get(10..).unwrap_or("").trim().to_string())
        } else {
            None
        };

        self.pending = Some(PendingFeature {
            fid,
            class_code,
            line: record.line,
            text,
            parts: Vec::new(),
            fields: Vec::new(),
        });
        Ok(())
    }

    fn read_attributes(&mut self, record: &RawRecord) -> Result<()> {
        if self.pending.is_none() {
            Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: "attribute record without a feature in progress".to_string(),
            })?;
        }
        let mut parsed = Vec::new();
        for token in record.payload.split('\\') {
            if token.is_empty() {
                continue;
            }
            if token.len() < 2 {
                Err(ErrorKind::MalformedRecord {
                    line: record.line,
                    msg: format!("attribute token too short: '{}'", token),
                })?;
            }
            let (code, value) = token.split_at(2);
            parsed.push((code.to_string(), FieldValue::parse(value)));
        }
        self.pending.as_mut().unwrap().fields.extend(parsed);
        Ok(())
    }

    fn read_geometry(&mut self, record: &RawRecord) -> Result<()> {
        if self.pending.is_none() {
            Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: "geometry record without a feature in progress".to_string(),
            })?;
        }
        if self.scale.is_none() {
            Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: "geometry record before any section header".to_string(),
            })?;
        }

        let count = _digits(&record.payload, record.line, 0, 4, "coordinate count")? as usize;
        let mut pairs = Vec::with_capacity(count);
        let mut offset = 4;
        for _ in 0..count {
            let x = _digits(&record.payload, record.line, offset, self.xylen, "x ordinate")?;
            let y = _digits(
                &record.payload,
                record.line,
                offset + self.xylen,
                self.xylen,
                "y ordinate",
            )?;
            pairs.push((x, y));
            offset += 2 * self.xylen;
        }
        if !record.payload[offset..].trim().is_empty() {
            Err(ErrorKind::MalformedRecord {
                line: record.line,
                msg: format!(
                    "geometry record declares {} coordinate pairs but carries extra data",
                    count
                ),
            })?;
        }

        self.pending.as_mut().unwrap().parts.push(pairs);
        Ok(())
    }

    /// Completes the feature in progress, if any: validates and builds its
    /// geometry, then routes it to the layer of its feature class (creating
    /// the layer on first encounter).
    fn finish_pending(&mut self) -> Result<()> {
        let pending = match self.pending.take() {
            None => return Ok(()),
            Some(p) => p,
        };
        // validated in start_feature
        let class = self
            .classes
            .iter()
            .find(|c| c.code == pending.class_code)
            .unwrap()
            .clone();

        let geometry = match class.kind {
            ClassKind::None => {
                if !pending.parts.is_empty() {
                    Err(ErrorKind::SchemaConflict {
                        layer_name: class.name.clone(),
                        msg: format!(
                            "feature {} carries geometry on an attribute-only class",
                            pending.fid
                        ),
                    })?;
                }
                Geometry::None
            }
            _ => {
                let scale = match &self.scale {
                    Some(scale) => *scale,
                    None => Err(ErrorKind::MalformedRecord {
                        line: pending.line,
                        msg: "feature with geometry before any section header".to_string(),
                    })?,
                };
                Geometry::from_raw_parts(
                    class.kind.geometry_type(),
                    &pending.parts,
                    &scale,
                    pending.fid,
                )?
            }
        };

        let mut fields = Vec::with_capacity(pending.fields.len() + 1);
        if let Some(text) = pending.text {
            fields.push(("TEXT".to_string(), FieldValue::StringValue(text)));
        }
        fields.extend(pending.fields);

        let layer_idx = match self.layer_idx_by_name.get(&class.name) {
            Some(&idx) => idx,
            None => {
                let idx = self.layers.len();
                self.layers.push(Layer {
                    name: class.name.clone(),
                    defn: LayerDefinition::new(class.kind.geometry_type()),
                    spatial_ref: None,
                    features: Vec::new(),
                });
                self.layer_idx_by_name.insert(class.name.clone(), idx);
                idx
            }
        };
        let layer = &mut self.layers[layer_idx];
        for (name, value) in &fields {
            layer.defn.note_field(name, value.field_type());
        }
        layer.features.push(Feature {
            fid: pending.fid,
            geometry,
            fields,
        });
        self.n_features += 1;
        Ok(())
    }

    fn build(mut self) -> Dataset {
        // geometry layers share the one spatial reference, by Arc
        for layer in self.layers.iter_mut() {
            if layer.defn.geometry_type() != GeometryType::None {
                layer.spatial_ref = self.spatial_ref.clone();
            }
        }

        if !self.classes.is_empty() {
            let mut defn = LayerDefinition::new(GeometryType::None);
            let mut features = Vec::with_capacity(self.classes.len());
            for (i, class) in self.classes.iter().enumerate() {
                let fields = vec![
                    (
                        "FEAT_CODE".to_string(),
                        FieldValue::StringValue(format!("{:04}", class.code)),
                    ),
                    (
                        "FEAT_NAME".to_string(),
                        FieldValue::StringValue(class.name.clone()),
                    ),
                ];
                for (name, value) in &fields {
                    defn.note_field(name, value.field_type());
                }
                features.push(Feature {
                    fid: (i + 1) as i64,
                    geometry: Geometry::None,
                    fields,
                });
            }
            self.layers.push(Layer {
                name: FEATURE_CLASSES_LAYER_NAME.to_string(),
                defn,
                spatial_ref: None,
                features,
            });
        }

        let db_name = self.db_name.take();
        let volume_name = self.volume_name.take();
        let name = db_name
            .filter(|n| !n.is_empty())
            .or_else(|| volume_name.filter(|n| !n.is_empty()))
            .unwrap_or(self.source_name);

        Dataset {
            name,
            creation_date: self.creation_date,
            spatial_ref: self.spatial_ref,
            layers: self.layers,
        }
    }
}

fn parse_yyyymmdd(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse::<i32>().ok()?;
    let month = s[4..6].parse::<u32>().ok()?;
    let day = s[6..8].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
