//! Iteration decoder: raw rows of the iteration table.

use super::schema::{SchemaGeneration, ITERATIONS_TABLE, SCALAR_COLUMNS};
use crate::error::{RecordingError, Result};
use crate::npy::StructuredArray;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// How many rows a query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    All,
    First,
}

impl Selector {
    pub fn from_only_first(only_first: bool) -> Self {
        if only_first {
            Selector::First
        } else {
            Selector::All
        }
    }
}

/// Array columns of one row, by schema generation.
///
/// `None` stands for a NULL column.
#[derive(Debug, Clone, PartialEq)]
pub enum RowArrays {
    Unified {
        inputs: Option<StructuredArray>,
        outputs: Option<StructuredArray>,
    },
    PreSplit {
        desvars: Option<StructuredArray>,
        responses: Option<StructuredArray>,
        objectives: Option<StructuredArray>,
        constraints: Option<StructuredArray>,
        sysincludes: Option<StructuredArray>,
    },
}

/// One decoded, not yet classified, iteration row.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRow {
    pub coordinate: String,
    pub timestamp: f64,
    pub success: i64,
    pub msg: String,
    pub counter: i64,
    pub arrays: RowArrays,
}

/// Row as read from SQLite, before any buffer is decoded.
struct RawRow {
    coordinate: String,
    timestamp: f64,
    success: i64,
    msg: String,
    counter: i64,
    blobs: Vec<Option<Vec<u8>>>,
}

/// Read and decode iteration rows in table order.
pub fn decode_iterations(
    conn: &Connection,
    generation: SchemaGeneration,
    selector: Selector,
) -> Result<Vec<IterationRow>> {
    let array_columns = generation.array_columns();
    let mut sql = format!(
        "SELECT {}, {} FROM {ITERATIONS_TABLE}",
        SCALAR_COLUMNS.join(", "),
        array_columns.join(", ")
    );
    if selector == Selector::First {
        sql.push_str(" LIMIT 1");
    }

    let mut stmt = conn.prepare(&sql)?;
    let raw_rows = stmt
        .query_map([], |row| {
            let mut blobs = Vec::with_capacity(array_columns.len());
            for idx in 0..array_columns.len() {
                blobs.push(blob_at(row.get_ref(SCALAR_COLUMNS.len() + idx)?));
            }
            Ok(RawRow {
                coordinate: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                timestamp: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                success: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
                msg: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                counter: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
                blobs,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    tracing::debug!(rows = raw_rows.len(), %generation, "read iteration rows");
    raw_rows.into_iter().map(|raw| decode_row(raw, generation)).collect()
}

fn blob_at(value: ValueRef<'_>) -> Option<Vec<u8>> {
    match value {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => Some(bytes.to_vec()),
        _ => None,
    }
}

fn decode_row(raw: RawRow, generation: SchemaGeneration) -> Result<IterationRow> {
    let mut decoded = raw
        .blobs
        .iter()
        .zip(generation.array_columns())
        .map(|(blob, column)| decode_blob(blob.as_deref(), &raw.coordinate, column))
        .collect::<Result<Vec<_>>>()?
        .into_iter();
    let mut next = || decoded.next().flatten();

    let arrays = match generation {
        SchemaGeneration::Unified => RowArrays::Unified { inputs: next(), outputs: next() },
        SchemaGeneration::PreSplit => RowArrays::PreSplit {
            desvars: next(),
            responses: next(),
            objectives: next(),
            constraints: next(),
            sysincludes: next(),
        },
    };

    Ok(IterationRow {
        coordinate: raw.coordinate,
        timestamp: raw.timestamp,
        success: raw.success,
        msg: raw.msg,
        counter: raw.counter,
        arrays,
    })
}

fn decode_blob(blob: Option<&[u8]>, coordinate: &str, column: &str) -> Result<Option<StructuredArray>> {
    let Some(bytes) = blob else { return Ok(None) };
    StructuredArray::from_bytes(bytes).map(Some).map_err(|e| RecordingError::MalformedRow {
        coordinate: coordinate.to_string(),
        column: column.to_string(),
        message: e.to_string(),
    })
}
