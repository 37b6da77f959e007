//! Recording table layout and schema-generation detection.

use crate::error::Result;
use rusqlite::Connection;
use serde::Serialize;

pub(crate) const ITERATIONS_TABLE: &str = "driver_iterations";
pub(crate) const METADATA_TABLE: &str = "metadata";
pub(crate) const DRIVER_METADATA_TABLE: &str = "driver_metadata";
pub(crate) const LAYOUTS_TABLE: &str = "layouts";

/// Fixed key of the single layout row.
pub(crate) const LAYOUT_ID: i64 = 0;

pub(crate) const CREATE_LAYOUTS_SQL: &str =
    "CREATE TABLE IF NOT EXISTS layouts (id integer PRIMARY KEY, layout text)";

/// Scalar columns read from every iteration row, in projection order.
pub(crate) const SCALAR_COLUMNS: [&str; 5] =
    ["iteration_coordinate", "timestamp", "success", "msg", "counter"];

/// Which array columns the iteration table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaGeneration {
    /// `inputs` and `outputs`; outputs are classified through the catalog.
    Unified,
    /// Role-split `desvars`, `responses`, `objectives`, `constraints`, `sysincludes`.
    PreSplit,
}

impl SchemaGeneration {
    pub fn array_columns(&self) -> &'static [&'static str] {
        match self {
            SchemaGeneration::Unified => &["inputs", "outputs"],
            SchemaGeneration::PreSplit => {
                &["desvars", "responses", "objectives", "constraints", "sysincludes"]
            }
        }
    }

    /// Pick the generation from the iteration table's columns.
    ///
    /// `None` when the table is missing or carries neither layout.
    pub fn detect(conn: &Connection) -> Result<Option<Self>> {
        let columns = table_columns(conn, ITERATIONS_TABLE)?;
        let has_all = |generation: SchemaGeneration| {
            generation.array_columns().iter().all(|c| columns.iter().any(|x| x == c))
        };

        if has_all(SchemaGeneration::Unified) {
            Ok(Some(SchemaGeneration::Unified))
        } else if has_all(SchemaGeneration::PreSplit) {
            Ok(Some(SchemaGeneration::PreSplit))
        } else {
            Ok(None)
        }
    }
}

impl std::fmt::Display for SchemaGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaGeneration::Unified => write!(f, "unified (inputs/outputs)"),
            SchemaGeneration::PreSplit => write!(f, "pre-split (desvars/responses/...)"),
        }
    }
}

/// Column names of `table`, empty when the table does not exist.
pub(crate) fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists)
}
