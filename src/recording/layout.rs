//! Layout store: one JSON document per recording.

use super::schema::{table_exists, CREATE_LAYOUTS_SQL, LAYOUTS_TABLE, LAYOUT_ID};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value as Json;

/// The stored layout, `None` if none was ever written.
pub fn read_layout(conn: &Connection) -> Result<Option<Json>> {
    if !table_exists(conn, LAYOUTS_TABLE)? {
        return Ok(None);
    }
    let text: Option<Option<String>> = conn
        .query_row(
            &format!("SELECT layout FROM {LAYOUTS_TABLE} WHERE id = ?1"),
            [LAYOUT_ID],
            |row| row.get(0),
        )
        .optional()?;

    match text.flatten() {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

/// Replace the stored layout with `document`.
pub fn write_layout(conn: &Connection, document: &Json) -> Result<()> {
    conn.execute(CREATE_LAYOUTS_SQL, [])?;
    conn.execute(
        &format!("INSERT OR REPLACE INTO {LAYOUTS_TABLE} VALUES (?1, ?2)"),
        params![LAYOUT_ID, serde_json::to_string(document)?],
    )?;
    tracing::debug!("layout replaced");
    Ok(())
}
