//! Driver metadata: the model-viewer payload.

use super::pickle::{decode_pickle, pickle_to_json};
use super::schema::{table_columns, DRIVER_METADATA_TABLE};
use crate::error::{RecordingError, Result};
use crate::npy::{has_magic, NamedColumns, NpyArray};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde_json::{Map, Value as Json};

const PAYLOAD_COLUMN: &str = "model_viewer_data";

/// The decoded model-viewer payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverMetadataRecord {
    pub model_viewer_data: Json,
}

/// Read the first driver metadata row, `None` when there is none.
pub fn read_driver_metadata(conn: &Connection) -> Result<Option<DriverMetadataRecord>> {
    let columns = table_columns(conn, DRIVER_METADATA_TABLE)?;
    if !columns.iter().any(|c| c == PAYLOAD_COLUMN) {
        return Ok(None);
    }

    let sql = format!("SELECT {PAYLOAD_COLUMN} FROM {DRIVER_METADATA_TABLE} LIMIT 1");
    let payload = conn
        .query_row(&sql, [], |row| Ok(decode_payload(row.get_ref(0)?)))
        .optional()?;

    match payload {
        None => Ok(None),
        Some(Ok(model_viewer_data)) => Ok(Some(DriverMetadataRecord { model_viewer_data })),
        Some(Err(message)) => Err(RecordingError::MalformedRow {
            coordinate: DRIVER_METADATA_TABLE.to_string(),
            column: PAYLOAD_COLUMN.to_string(),
            message,
        }),
    }
}

/// Decode the payload column.
///
/// An npy buffer is decoded by dtype: numeric arrays become nested lists,
/// structured arrays an object of columns, object arrays their pickled
/// contents. Other blobs are read as a bare pickle. Text is parsed as JSON
/// and kept as a string when it is not JSON.
pub(crate) fn decode_payload(value: ValueRef<'_>) -> std::result::Result<Json, String> {
    match value {
        ValueRef::Null => Ok(Json::Null),
        ValueRef::Integer(n) => Ok(Json::from(n)),
        ValueRef::Real(f) => Ok(serde_json::Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null)),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            Ok(serde_json::from_str(&text).unwrap_or_else(|_| Json::String(text.into_owned())))
        }
        ValueRef::Blob(bytes) if has_magic(bytes) => decode_npy(bytes),
        ValueRef::Blob(bytes) => decode_pickle(bytes).map(|v| pickle_to_json(&v)),
    }
}

fn decode_npy(bytes: &[u8]) -> std::result::Result<Json, String> {
    match NpyArray::decode(bytes).map_err(|e| e.to_string())? {
        NpyArray::Object { pickle, .. } => decode_pickle(&pickle).map(|v| pickle_to_json(&v)),
        NpyArray::Structured(array) => {
            let mut object = Map::new();
            for name in array.names() {
                let column = array.column(name).unwrap_or(crate::npy::FieldValue::List(Vec::new()));
                object.insert(name.to_string(), serde_json::to_value(column).map_err(|e| e.to_string())?);
            }
            Ok(Json::Object(object))
        }
        numeric => {
            let value = numeric.to_value().unwrap_or(crate::npy::FieldValue::List(Vec::new()));
            serde_json::to_value(value).map_err(|e| e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npy::testing::{preamble, NpyBuilder};
    use serde_pickle::{HashableValue, SerOptions, Value as PickleValue};
    use std::collections::BTreeMap;

    fn table(conn: &Connection) {
        conn.execute_batch("CREATE TABLE driver_metadata (id TEXT, model_viewer_data BLOB)").unwrap();
    }

    #[test]
    fn test_missing_table_and_empty_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_driver_metadata(&conn).unwrap(), None);
        table(&conn);
        assert_eq!(read_driver_metadata(&conn).unwrap(), None);
    }

    #[test]
    fn test_bare_pickle_payload() {
        let conn = Connection::open_in_memory().unwrap();
        table(&conn);
        let mut tree = BTreeMap::new();
        tree.insert(HashableValue::String("tree".into()), PickleValue::List(vec![PickleValue::I64(1)]));
        let blob = serde_pickle::value_to_vec(&PickleValue::Dict(tree), SerOptions::new()).unwrap();
        conn.execute("INSERT INTO driver_metadata VALUES ('Driver', ?1)", [blob]).unwrap();

        let record = read_driver_metadata(&conn).unwrap().unwrap();
        assert_eq!(record.model_viewer_data, serde_json::json!({"tree": [1]}));
    }

    #[test]
    fn test_numeric_npy_payload() {
        let mut bytes = preamble("{'descr': '<i8', 'fortran_order': False, 'shape': (2, 2), }");
        for n in [1i64, 2, 3, 4] {
            bytes.extend_from_slice(&n.to_le_bytes());
        }
        let json = decode_payload(ValueRef::Blob(&bytes)).unwrap();
        assert_eq!(json, serde_json::json!([[1, 2], [3, 4]]));
    }

    #[test]
    fn test_object_npy_payload() {
        let pickle = serde_pickle::value_to_vec(&PickleValue::String("viewer".into()), SerOptions::new())
            .unwrap();
        let mut bytes = preamble("{'descr': '|O', 'fortran_order': False, 'shape': (), }");
        bytes.extend_from_slice(&pickle);
        assert_eq!(decode_payload(ValueRef::Blob(&bytes)).unwrap(), serde_json::json!("viewer"));
    }

    #[test]
    fn test_structured_npy_payload() {
        let bytes = NpyBuilder::new().scalar("a", 1.0).build();
        assert_eq!(decode_payload(ValueRef::Blob(&bytes)).unwrap(), serde_json::json!({"a": [1.0]}));
    }

    #[test]
    fn test_corrupt_payload_is_malformed_row() {
        let conn = Connection::open_in_memory().unwrap();
        table(&conn);
        conn.execute("INSERT INTO driver_metadata VALUES ('Driver', x'ffff00')", []).unwrap();
        assert!(matches!(
            read_driver_metadata(&conn),
            Err(RecordingError::MalformedRow { column, .. }) if column == PAYLOAD_COLUMN
        ));
    }

    #[test]
    fn test_text_payload() {
        assert_eq!(decode_payload(ValueRef::Text(b"{\"a\": 1}")).unwrap(), serde_json::json!({"a": 1}));
        assert_eq!(decode_payload(ValueRef::Text(b"plain")).unwrap(), serde_json::json!("plain"));
    }
}
