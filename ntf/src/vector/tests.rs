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
use std::io;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::errors::*;
use crate::vector::{
    Dataset, FieldValue, Geometry, GeometryType, ReadOptions, Strictness,
    FEATURE_CLASSES_LAYER_NAME,
};

fn open_str(input: &str, strictness: Strictness) -> anyhow::Result<Dataset> {
    Dataset::from_reader(
        "test-input",
        Cursor::new(input.to_string()),
        ReadOptions { strictness },
    )
}

/// Emits one logical record as physical lines, continuing past 77 payload
/// characters per line.
fn logical(descriptor: &str, payload: &str) -> String {
    let mut out = String::new();
    let mut i = 0;
    let mut first = true;
    while first || i < payload.len() {
        let end = (i + 77).min(payload.len());
        let desc = if first { descriptor } else { "00" };
        let marker = if end == payload.len() { "%" } else { "1" };
        out.push_str(desc);
        out.push_str(&payload[i..end]);
        out.push_str(marker);
        out.push('\n');
        first = false;
        i = end;
    }
    out
}

fn volume_header() -> String {
    logical("01", &format!("{:<20}{}{}", "SS", "0200", "20090501"))
}

fn section_header(xylen: usize, mult: &str, xorig: &str, yorig: &str) -> String {
    logical(
        "07",
        &format!("{:02}{:>10}{:>10}{:>10}", xylen, mult, xorig, yorig),
    )
}

fn feature_class(code: i64, kind: char, name: &str) -> String {
    logical("05", &format!("{:04}{}{}", code, kind, name))
}

fn feature_start(rec: &str, fid: i64, class_code: i64) -> String {
    logical(rec, &format!("{:06}{:04}", fid, class_code))
}

fn geometry(coords: &[(i64, i64)], xylen: usize) -> String {
    let mut payload = format!("{:04}", coords.len());
    for &(x, y) in coords {
        payload.push_str(&format!("{:0w$}{:0w$}", x, y, w = xylen));
    }
    logical("21", &payload)
}

/// The five-layer scenario: one point class, one line class, one text class,
/// one attribute-only class, plus the synthetic FEATURE_CLASSES layer.
fn sample_dataset() -> String {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&logical("02", "STRATEGI SAMPLE"));
    s.push_str(&feature_class(1, 'P', "STRATEGI_POINT"));
    s.push_str(&feature_class(2, 'L', "STRATEGI_LINE"));
    s.push_str(&feature_class(3, 'T', "STRATEGI_TEXT"));
    s.push_str(&feature_class(4, 'N', "STRATEGI_NODE"));
    s.push_str(&section_header(6, "1.000", "0", "0"));
    s.push_str(&logical("08", "British National Grid\\OSGB 1936"));

    s.push_str(&feature_start("15", 1, 1));
    s.push_str(&geometry(&[(222904, 127850)], 6));
    s.push_str(&logical("14", "HT0042\\NMSample point"));

    s.push_str(&feature_start("15", 2, 1));
    s.push_str(&geometry(&[(222000, 127000)], 6));

    s.push_str(&feature_start("23", 3, 2));
    s.push_str(&geometry(
        &[(275324, 189274), (275233, 189114), (275153, 189048)],
        6,
    ));

    // text record carries the string after the id and class code
    s.push_str(&logical("43", &format!("{:06}{:04}{}", 4, 3, "Afon Afan")));
    s.push_str(&geometry(&[(275000, 189000)], 6));

    s.push_str(&feature_start("16", 5, 4));
    s.push_str(&logical("14", "FC0030"));
    s.push_str(&feature_start("16", 6, 4));
    s.push_str(&logical("14", "FC0031"));

    s.push_str(&logical("99", ""));
    s
}

#[test]
fn test_layer_count_and_schema() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    assert_eq!(ds.count(), 5);

    let expected = [
        ("STRATEGI_POINT", GeometryType::Point, 2),
        ("STRATEGI_LINE", GeometryType::LineString, 1),
        ("STRATEGI_TEXT", GeometryType::Point, 1),
        ("STRATEGI_NODE", GeometryType::None, 2),
        (FEATURE_CLASSES_LAYER_NAME, GeometryType::None, 4),
    ];
    for &(name, geom_type, count) in expected.iter() {
        let layer = ds.layer_by_name(name).unwrap();
        assert_eq!(layer.layer_definition().geometry_type(), geom_type, "{}", name);
        assert_eq!(layer.count(), count, "{}", name);
        if geom_type != GeometryType::None {
            let wkt = layer.spatial_reference().unwrap().to_wkt();
            assert!(wkt.contains("OSGB 1936"), "{}", wkt);
        } else {
            assert!(layer.spatial_reference().is_err());
        }
    }
}

#[test]
fn test_layer_insertion_order_is_first_seen() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    let names: Vec<&str> = ds.layers().map(|l| l.name()).collect();
    assert_eq!(
        names,
        vec![
            "STRATEGI_POINT",
            "STRATEGI_LINE",
            "STRATEGI_TEXT",
            "STRATEGI_NODE",
            FEATURE_CLASSES_LAYER_NAME,
        ]
    );
}

#[test]
fn test_first_point_feature_wkt() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    let layer = ds.layer_by_name("STRATEGI_POINT").unwrap();
    let feat = layer.features().next().unwrap();
    assert_eq!(feat.geometry().wkt(), "POINT (222904 127850)");
}

#[test]
fn test_line_feature_wkt() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    let layer = ds.layer_by_name("STRATEGI_LINE").unwrap();
    let feat = layer.features().next().unwrap();
    assert_eq!(
        feat.geometry().wkt(),
        "LINESTRING (275324 189274,275233 189114,275153 189048)"
    );
}

#[test]
fn test_geometry_variant_matches_layer_type() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    for layer in ds.layers() {
        let declared = layer.layer_definition().geometry_type();
        for feat in layer.features() {
            assert_eq!(feat.geometry().geometry_type(), declared, "{}", layer.name());
        }
    }
}

#[test]
fn test_feature_iteration_is_restartable_and_stable() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    let layer = ds.layer_by_name("STRATEGI_POINT").unwrap();

    let first_pass: Vec<i64> = layer.features().map(|f| f.fid()).collect();
    let second_pass: Vec<i64> = layer.features().map(|f| f.fid()).collect();
    assert_eq!(first_pass, second_pass);
    assert_eq!(first_pass, vec![1, 2]);

    let mut it = layer.features();
    assert_eq!(it.next().unwrap().fid(), 1);
    it.reset();
    assert_eq!(it.next().unwrap().fid(), 1);
}

#[test]
fn test_attribute_fields() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();

    let point = ds
        .layer_by_name("STRATEGI_POINT")
        .unwrap()
        .features()
        .next()
        .unwrap();
    assert_eq!(point.field("HT").unwrap().to_int(), Some(42));
    assert_eq!(
        point.field("NM").unwrap(),
        FieldValue::StringValue("Sample point".to_string())
    );
    assert!(point.field("NO_SUCH").is_err());

    let text = ds
        .layer_by_name("STRATEGI_TEXT")
        .unwrap()
        .features()
        .next()
        .unwrap();
    assert_eq!(
        text.field("TEXT").unwrap(),
        FieldValue::StringValue("Afon Afan".to_string())
    );

    let node = ds
        .layer_by_name("STRATEGI_NODE")
        .unwrap()
        .features()
        .next()
        .unwrap();
    assert_eq!(node.field("FC").unwrap().to_int(), Some(30));
    assert_eq!(*node.geometry(), Geometry::None);
}

#[test]
fn test_feature_classes_layer() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    let layer = ds.layer_by_name(FEATURE_CLASSES_LAYER_NAME).unwrap();
    assert_eq!(layer.count(), 4);
    assert_eq!(layer.layer_definition().geometry_type(), GeometryType::None);

    let first = layer.features().next().unwrap();
    assert_eq!(
        first.field("FEAT_CODE").unwrap(),
        FieldValue::StringValue("0001".to_string())
    );
    assert_eq!(
        first.field("FEAT_NAME").unwrap(),
        FieldValue::StringValue("STRATEGI_POINT".to_string())
    );

    // last in layer order
    let last = ds.layer(ds.count() - 1).unwrap();
    assert_eq!(last.name(), FEATURE_CLASSES_LAYER_NAME);
}

#[test]
fn test_dataset_metadata() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    assert_eq!(ds.name(), "STRATEGI SAMPLE");
    assert_eq!(
        ds.creation_date(),
        chrono::NaiveDate::from_ymd_opt(2009, 5, 1)
    );
    assert!(ds.spatial_reference().unwrap().to_wkt().contains("OSGB 1936"));
}

#[test]
fn test_spatial_reference_is_shared_not_copied() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    let point = ds.layer_by_name("STRATEGI_POINT").unwrap();
    let line = ds.layer_by_name("STRATEGI_LINE").unwrap();
    assert!(Arc::ptr_eq(
        point.spatial_ref.as_ref().unwrap(),
        line.spatial_ref.as_ref().unwrap()
    ));
}

#[test]
fn test_layer_by_name_not_found() {
    let ds = open_str(&sample_dataset(), Strictness::Strict).unwrap();
    let err = ds.layer_by_name("NO_SUCH_LAYER").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ErrorKind>(),
        Some(ErrorKind::NotFound { .. })
    ));
    assert!(ds.layer(99).is_err());
}

#[test]
fn test_scaled_coordinates() {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'P', "POINTS"));
    s.push_str(&section_header(5, "0.01", "100000", "-50000"));
    s.push_str(&feature_start("15", 1, 1));
    s.push_str(&geometry(&[(12345, 67890)], 5));
    s.push_str(&logical("99", ""));

    let ds = open_str(&s, Strictness::Strict).unwrap();
    let feat = ds.layer_by_name("POINTS").unwrap().features().next().unwrap();
    match feat.geometry() {
        Geometry::Point(c) => {
            crate::assert_almost_eq(c.x, 100123.45);
            crate::assert_almost_eq(c.y, -49321.1);
        }
        other => panic!("unexpected geometry: {:?}", other),
    }
}

#[test]
fn test_long_line_uses_continuation_records() {
    let coords: Vec<(i64, i64)> = (0..20).map(|i| (1000 + i, 2000 + i)).collect();
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'L', "LINES"));
    s.push_str(&section_header(6, "1.000", "0", "0"));
    s.push_str(&feature_start("23", 1, 1));
    let geom = geometry(&coords, 6);
    assert!(geom.lines().count() > 1, "geometry must span physical records");
    s.push_str(&geom);
    s.push_str(&logical("99", ""));

    let ds = open_str(&s, Strictness::Strict).unwrap();
    let feat = ds.layer_by_name("LINES").unwrap().features().next().unwrap();
    assert_eq!(feat.geometry().point_count(), 20);
}

#[test]
fn test_unclosed_ring_strict_aborts_lenient_skips() {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'A', "AREAS"));
    s.push_str(&section_header(6, "1.000", "0", "0"));
    // good polygon
    s.push_str(&feature_start("24", 1, 1));
    s.push_str(&geometry(&[(0, 0), (0, 10), (10, 10), (0, 0)], 6));
    // unclosed ring
    s.push_str(&feature_start("24", 2, 1));
    s.push_str(&geometry(&[(0, 0), (0, 10), (10, 10), (10, 0)], 6));
    s.push_str(&logical("99", ""));

    let err = open_str(&s, Strictness::Strict).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ErrorKind>(),
        Some(ErrorKind::OpenError { .. })
    ));

    let ds = open_str(&s, Strictness::Lenient).unwrap();
    let layer = ds.layer_by_name("AREAS").unwrap();
    assert_eq!(layer.count(), 1);
    assert_eq!(layer.features().next().unwrap().fid(), 1);
}

#[test]
fn test_lenient_keeps_valid_feature_after_invalid_one() {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'A', "AREAS"));
    s.push_str(&section_header(6, "1.000", "0", "0"));
    // unclosed ring first
    s.push_str(&feature_start("24", 1, 1));
    s.push_str(&geometry(&[(0, 0), (0, 10), (10, 10), (10, 0)], 6));
    // the valid polygon after it must survive the skip
    s.push_str(&feature_start("24", 2, 1));
    s.push_str(&geometry(&[(0, 0), (0, 10), (10, 10), (0, 0)], 6));
    s.push_str(&logical("99", ""));

    let ds = open_str(&s, Strictness::Lenient).unwrap();
    let layer = ds.layer_by_name("AREAS").unwrap();
    assert_eq!(layer.count(), 1);
    assert_eq!(layer.features().next().unwrap().fid(), 2);
}

#[test]
fn test_malformed_record_strict_aborts_lenient_skips() {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'P', "POINTS"));
    s.push_str(&section_header(6, "1.000", "0", "0"));
    s.push_str("this is not a record\n");
    s.push_str(&feature_start("15", 1, 1));
    s.push_str(&geometry(&[(5, 5)], 6));
    s.push_str(&logical("99", ""));

    assert!(open_str(&s, Strictness::Strict).is_err());

    let ds = open_str(&s, Strictness::Lenient).unwrap();
    assert_eq!(ds.layer_by_name("POINTS").unwrap().count(), 1);
}

#[test]
fn test_undeclared_class_is_recoverable() {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'P', "POINTS"));
    s.push_str(&section_header(6, "1.000", "0", "0"));
    s.push_str(&feature_start("15", 1, 9)); // class 0009 never declared
    s.push_str(&geometry(&[(5, 5)], 6));
    s.push_str(&feature_start("15", 2, 1));
    s.push_str(&geometry(&[(6, 6)], 6));
    s.push_str(&logical("99", ""));

    assert!(open_str(&s, Strictness::Strict).is_err());

    let ds = open_str(&s, Strictness::Lenient).unwrap();
    let layer = ds.layer_by_name("POINTS").unwrap();
    assert_eq!(layer.count(), 1);
    assert_eq!(layer.features().next().unwrap().fid(), 2);
}

#[test]
fn test_schema_conflict_is_fatal_even_in_lenient_mode() {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'P', "ROADS"));
    s.push_str(&feature_class(2, 'L', "ROADS"));
    s.push_str(&logical("99", ""));

    for strictness in [Strictness::Strict, Strictness::Lenient].iter() {
        let err = open_str(&s, *strictness).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ErrorKind>(),
            Some(ErrorKind::SchemaConflict { .. })
        ));
    }
}

#[test]
fn test_geometry_on_attribute_only_class_is_fatal() {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'N', "NODES"));
    s.push_str(&section_header(6, "1.000", "0", "0"));
    s.push_str(&feature_start("16", 1, 1));
    s.push_str(&geometry(&[(5, 5)], 6));
    s.push_str(&logical("99", ""));

    let err = open_str(&s, Strictness::Lenient).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ErrorKind>(),
        Some(ErrorKind::SchemaConflict { .. })
    ));
}

#[test]
fn test_unsupported_format_version() {
    let s = logical("01", &format!("{:<20}{}", "SS", "0300"));
    let err = open_str(&s, Strictness::Lenient).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ErrorKind>(),
        Some(ErrorKind::UnsupportedVersion { .. })
    ));
}

#[test]
fn test_missing_volume_header() {
    let s = logical("02", "NO HEADER HERE");
    let err = open_str(&s, Strictness::Lenient).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ErrorKind>(),
        Some(ErrorKind::MissingHeader)
    ));

    assert!(open_str("", Strictness::Lenient).is_err());
}

struct BrokenSource;

impl io::Read for BrokenSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "device offline"))
    }
}

#[test]
fn test_unreadable_source_reports_open_error() {
    let err = Dataset::from_reader(
        "broken-input",
        io::BufReader::new(BrokenSource),
        ReadOptions::default(),
    )
    .unwrap_err();
    match err.downcast_ref::<ErrorKind>() {
        Some(ErrorKind::OpenError { msg, .. }) => assert!(msg.contains("device offline")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_missing_terminator_strict_only() {
    let mut s = String::new();
    s.push_str(&volume_header());
    s.push_str(&feature_class(1, 'P', "POINTS"));
    s.push_str(&section_header(6, "1.000", "0", "0"));
    s.push_str(&feature_start("15", 1, 1));
    s.push_str(&geometry(&[(5, 5)], 6));
    // no 99 record

    assert!(open_str(&s, Strictness::Strict).is_err());

    let ds = open_str(&s, Strictness::Lenient).unwrap();
    assert_eq!(ds.layer_by_name("POINTS").unwrap().count(), 1);
}

#[test]
fn test_open_fixture_by_path() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample.ntf");
    let ds = Dataset::open(&path).unwrap();
    assert_eq!(ds.count(), 4);

    let points = ds.layer_by_name("STRATEGI_POINT").unwrap();
    assert_eq!(points.count(), 1);
    assert_eq!(
        points.features().next().unwrap().geometry().wkt(),
        "POINT (222904 127850)"
    );

    let missing = Dataset::open(Path::new("fixtures/no_such_file.ntf"));
    assert!(missing.is_err());
}
