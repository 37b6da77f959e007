//! Iteration decoding, classification and assembly through `RecordingFile`.

use super::fixtures::{abs2meta, desvar_objective_recording, scalars, Recording};
use crate::error::RecordingError;
use crate::npy::testing::NpyBuilder;
use crate::npy::FieldValue;
use crate::recording::{RecordingFile, SchemaGeneration};
use serde_json::json;

fn connected(recording: &Recording) -> RecordingFile {
    let mut file = RecordingFile::new();
    assert!(file.connect(recording.path()).expect("connect should succeed"));
    file
}

// =============================================================================
// Unified schema
// =============================================================================

#[test]
fn test_desvar_and_objective_scenario() {
    let recording = desvar_objective_recording();
    let file = connected(&recording);
    assert_eq!(file.generation().expect("detect"), Some(SchemaGeneration::Unified));

    let records = file.get_driver_iterations(false).expect("iterations");
    assert_eq!(records.len(), 1);
    let json = serde_json::to_value(&records[0]).expect("serialize");

    assert_eq!(json["desvars"], json!([{"name": "x", "values": 1.0}]));
    assert_eq!(json["objectives"], json!([{"name": "f", "values": 2.0}]));
    assert_eq!(json["constraints"], json!([]));
    assert_eq!(json["sysincludes"], json!([]));
    assert_eq!(json["inputs"], json!([]));
    assert_eq!(json["counter"], 1);
    assert_eq!(json["iteration_coordinate"], "rank0:SLSQP|1");
}

#[test]
fn test_only_first_returns_one_record() {
    let recording = desvar_objective_recording();
    recording.unified_row(2, None, Some(scalars(&[("x", 3.0), ("f", 4.0)])));
    recording.unified_row(3, None, Some(scalars(&[("x", 5.0), ("f", 6.0)])));
    let file = connected(&recording);

    let first = file.get_driver_iterations(true).expect("iterations");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].counter, 1);
    assert_eq!(file.get_driver_iterations(false).expect("iterations").len(), 3);
    assert_eq!(file.get_driver_iteration_data().expect("iterations").len(), 3);
}

#[test]
fn test_only_first_on_empty_table() {
    let recording = Recording::unified();
    let file = connected(&recording);
    assert!(file.get_driver_iterations(true).expect("iterations").is_empty());
    assert!(file.get_driver_iterations(false).expect("iterations").is_empty());
}

#[test]
fn test_empty_catalog_puts_outputs_in_sysincludes() {
    let recording = Recording::unified();
    recording.unified_row(1, None, Some(scalars(&[("a", 1.0), ("b", 2.0)])));
    let file = connected(&recording);

    let record = &file.get_driver_iterations(false).expect("iterations")[0];
    let names: Vec<_> = record.sysincludes.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(record.desvars.is_empty());
    assert!(record.objectives.is_empty());
    assert!(record.constraints.is_empty());
}

#[test]
fn test_inputs_are_never_classified() {
    let recording = Recording::unified();
    recording.catalog(None, None, Some(abs2meta(&[("x", &["desvar"])])));
    recording.unified_row(1, Some(scalars(&[("x", 9.0)])), None);
    let file = connected(&recording);

    let record = &file.get_driver_iterations(false).expect("iterations")[0];
    assert_eq!(record.inputs.len(), 1);
    assert_eq!(record.inputs[0].values, FieldValue::Float(9.0));
    assert!(record.desvars.is_empty());
}

#[test]
fn test_multi_tag_priority() {
    let recording = Recording::unified();
    recording.catalog(
        None,
        None,
        Some(abs2meta(&[("g", &["constraint", "objective"]), ("d", &["constraint", "desvar"])])),
    );
    recording.unified_row(1, None, Some(scalars(&[("g", 1.0), ("d", 2.0)])));
    let file = connected(&recording);

    let record = &file.get_driver_iterations(false).expect("iterations")[0];
    assert_eq!(record.objectives[0].name, "g");
    assert_eq!(record.desvars[0].name, "d");
    assert!(record.constraints.is_empty());
}

#[test]
fn test_subarray_field_keeps_shape() {
    let recording = Recording::unified();
    let outputs = NpyBuilder::new().field("m", &[2, 2], &[1.0, 2.0, 3.0, 4.0]).build();
    recording.unified_row(1, None, Some(outputs));
    let file = connected(&recording);

    let json = serde_json::to_value(&file.get_driver_iterations(false).expect("iterations")).expect("json");
    assert_eq!(json[0]["sysincludes"][0]["values"], json!([[1.0, 2.0], [3.0, 4.0]]));
}

#[test]
fn test_repeated_reads_are_identical() {
    let recording = desvar_objective_recording();
    recording.unified_row(2, Some(scalars(&[("a", 0.5)])), Some(scalars(&[("x", 3.0), ("z", 4.0)])));
    let file = connected(&recording);

    let first = serde_json::to_vec(&file.get_driver_iterations(false).expect("iterations")).expect("json");
    let second = serde_json::to_vec(&file.get_driver_iterations(false).expect("iterations")).expect("json");
    assert_eq!(first, second);
}

#[test]
fn test_malformed_row_surfaces_error() {
    let recording = desvar_objective_recording();
    recording.unified_row(2, None, Some(b"not an npy buffer".to_vec()));
    let file = connected(&recording);

    match file.get_driver_iterations(false) {
        Err(RecordingError::MalformedRow { coordinate, column, .. }) => {
            assert_eq!(coordinate, "rank0:SLSQP|2");
            assert_eq!(column, "outputs");
        }
        other => panic!("expected MalformedRow, got {other:?}"),
    }
    assert_eq!(file.get_driver_iterations(true).expect("first row is intact").len(), 1);
}

// =============================================================================
// Pre-split schema
// =============================================================================

#[test]
fn test_presplit_groups_map_directly() {
    let recording = Recording::presplit();
    recording.presplit_row(1, Some(scalars(&[("x", 1.0)])), Some(scalars(&[("f", 2.0)])));
    let file = connected(&recording);
    assert_eq!(file.generation().expect("detect"), Some(SchemaGeneration::PreSplit));

    let records = file.get_driver_iterations(false).expect("iterations");
    let json = serde_json::to_value(&records[0]).expect("json");
    assert_eq!(json["desvars"], json!([{"name": "x", "values": [1.0]}]));
    assert_eq!(json["objectives"], json!([{"name": "f", "values": [2.0]}]));
    assert_eq!(json["responses"], json!([]));
    assert_eq!(json["inputs"], json!([]));
    assert_eq!(json["msg"], "failed");
    assert!(!records[0].is_success());
}

#[test]
fn test_presplit_null_arrays_are_empty_groups() {
    let recording = Recording::presplit();
    recording.presplit_row(1, None, None);
    let file = connected(&recording);

    let record = &file.get_driver_iterations(false).expect("iterations")[0];
    assert!(record.desvars.is_empty());
    assert!(record.objectives.is_empty());
    assert!(record.sysincludes.is_empty());
    assert_eq!(record.responses.as_deref().map(<[_]>::len), Some(0));
}

// =============================================================================
// Change detection
// =============================================================================

#[test]
fn test_is_new_data() {
    let recording = desvar_objective_recording();
    recording.unified_row(5, None, None);
    let file = connected(&recording);

    assert!(file.is_new_data(0).expect("poll"));
    assert!(file.is_new_data(4).expect("poll"));
    assert!(!file.is_new_data(5).expect("poll"));
    assert!(!file.is_new_data(100).expect("poll"));
}

#[test]
fn test_iteration_table_created_after_connect_is_read() {
    let recording = Recording::blank();
    let file = connected(&recording);
    assert!(file.get_driver_iterations(false).expect("iterations").is_empty());
    assert_eq!(file.generation().expect("detect"), None);

    recording
        .conn()
        .execute_batch(
            "CREATE TABLE driver_iterations (id INTEGER PRIMARY KEY, counter INT,
             iteration_coordinate TEXT, timestamp REAL, success INT, msg TEXT,
             inputs BLOB, outputs BLOB);",
        )
        .expect("recorder creates the table");
    recording.unified_row(1, None, Some(scalars(&[("x", 1.0)])));

    assert!(file.is_new_data(0).expect("poll"));
    assert_eq!(file.generation().expect("detect"), Some(SchemaGeneration::Unified));
    let records = file.get_driver_iterations(false).expect("iterations");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sysincludes[0].name, "x");
}

#[test]
fn test_is_new_data_on_empty_table() {
    let recording = Recording::unified();
    let file = connected(&recording);
    assert!(!file.is_new_data(i64::MIN).expect("poll"));
}

#[test]
fn test_new_rows_visible_without_reconnect() {
    let recording = desvar_objective_recording();
    let file = connected(&recording);
    assert!(!file.is_new_data(1).expect("poll"));

    recording.unified_row(2, None, None);
    assert!(file.is_new_data(1).expect("poll"));
    assert_eq!(file.get_driver_iterations(false).expect("iterations").len(), 2);
}
