//! Catalog decoding through `RecordingFile`.

use super::fixtures::{abs2meta, desvar_objective_recording, name_map, scalars, Recording, PY2_ABS2META};
use crate::error::RecordingError;
use crate::recording::{DecodePath, RecordingFile, RoleTags};
use serde_json::json;

#[test]
fn test_catalog_decode_paths_are_recorded() {
    let recording = desvar_objective_recording();
    let mut file = RecordingFile::new();
    file.connect(recording.path()).expect("connect should succeed");

    let catalog = file.catalog().expect("catalog");
    assert_eq!(
        catalog.decode_paths(),
        &[
            ("abs2prom", DecodePath::Current),
            ("prom2abs", DecodePath::Current),
            ("abs2meta", DecodePath::Current),
        ]
    );
    assert!(catalog.roles("x").contains("desvar"));
    assert_eq!(catalog.roles("unknown"), RoleTags::default());
}

#[test]
fn test_null_catalog_columns_are_empty() {
    let recording = Recording::unified();
    recording.catalog(None, None, None);
    recording.unified_row(1, None, Some(scalars(&[("x", 1.0)])));
    let mut file = RecordingFile::new();
    assert!(file.connect(recording.path()).expect("connect should succeed"));

    let catalog = file.catalog().expect("catalog");
    assert!(catalog.is_empty());
    assert!(catalog.decode_paths().iter().all(|(_, path)| *path == DecodePath::Absent));
    let record = &file.get_driver_iterations(false).expect("iterations")[0];
    assert_eq!(record.sysincludes.len(), 1);
}

#[test]
fn test_legacy_text_catalog() {
    let recording = Recording::unified();
    recording
        .conn()
        .execute(
            "INSERT INTO metadata (format_version, abs2prom, prom2abs, abs2meta) VALUES (1, NULL, NULL, ?1)",
            [PY2_ABS2META],
        )
        .expect("insert legacy catalog");
    recording.unified_row(1, None, Some(scalars(&[("x", 1.0)])));

    let mut file = RecordingFile::new();
    assert!(file.connect(recording.path()).expect("connect should succeed"));
    let catalog = file.catalog().expect("catalog");
    assert!(catalog.decode_paths().contains(&("abs2meta", DecodePath::Legacy)));
    assert!(catalog.roles("x").contains("desvar"));

    let record = &file.get_driver_iterations(false).expect("iterations")[0];
    assert_eq!(record.desvars[0].name, "x");
}

#[test]
fn test_corrupt_catalog_fails_connect() {
    let recording = Recording::unified();
    recording.catalog(Some(b"\x80\x04garbage".to_vec()), None, None);

    let mut file = RecordingFile::new();
    match file.connect(recording.path()) {
        Err(RecordingError::CatalogDecode { column, .. }) => assert_eq!(column, "abs2prom"),
        other => panic!("expected CatalogDecode, got {other:?}"),
    }
    assert!(!file.is_connected());
    assert!(file.get_driver_iterations(false).expect("read").is_empty());
}

#[test]
fn test_get_metadata_returns_name_maps() {
    let recording = desvar_objective_recording();
    let mut file = RecordingFile::new();
    file.connect(recording.path()).expect("connect should succeed");

    let names = file.get_metadata().expect("metadata").expect("connected");
    assert_eq!(names.abs2prom, json!({"p.f": "f", "p.x": "x"}));
    assert_eq!(names.prom2abs, json!({"f": "p.f", "x": "p.x"}));
}

#[test]
fn test_get_metadata_without_row() {
    let recording = Recording::unified();
    let mut file = RecordingFile::new();
    file.connect(recording.path()).expect("connect should succeed");

    let names = file.get_metadata().expect("metadata").expect("connected");
    assert_eq!(names.abs2prom, json!({}));
    assert_eq!(names.prom2abs, json!({}));
}

#[test]
fn test_catalog_read_once_per_connection() {
    let recording = Recording::unified();
    recording.unified_row(1, None, Some(scalars(&[("x", 1.0)])));
    let mut file = RecordingFile::new();
    file.connect(recording.path()).expect("connect should succeed");

    recording.catalog(Some(name_map(&[])), Some(name_map(&[])), Some(abs2meta(&[("x", &["desvar"])])));
    let record = &file.get_driver_iterations(false).expect("iterations")[0];
    assert!(record.desvars.is_empty());

    file.connect(recording.path()).expect("reconnect should succeed");
    let record = &file.get_driver_iterations(false).expect("iterations")[0];
    assert_eq!(record.desvars.len(), 1);
}
