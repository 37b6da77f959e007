//! `RecordingFile`: connection lifecycle and the public read/write operations.

use super::assemble::{assemble_all, IterationRecord};
use super::catalog::{load_names, Catalog, VariableNames};
use super::iterations::{decode_iterations, Selector};
use super::layout::{read_layout, write_layout};
use super::metadata::{read_driver_metadata, DriverMetadataRecord};
use super::schema::{table_exists, SchemaGeneration, CREATE_LAYOUTS_SQL, ITERATIONS_TABLE};
use super::validate::FormatValidator;
use crate::config::ReaderConfig;
use crate::error::Result;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value as Json;
use std::path::{Path, PathBuf};

/// An open recording: connection plus the catalog read at connect time.
#[derive(Debug)]
struct Session {
    path: PathBuf,
    conn: Connection,
    catalog: Catalog,
}

/// Reader over one recording file.
///
/// Holds at most one connection. Every read issued while disconnected
/// returns an empty result; the connection is released on drop.
#[derive(Debug, Default)]
pub struct RecordingFile {
    config: ReaderConfig,
    session: Option<Session>,
}

impl RecordingFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config, session: None }
    }

    /// Open `path`, replacing any current connection.
    ///
    /// Returns `Ok(false)` without touching SQLite when the file fails format
    /// validation. A catalog column that cannot be decoded fails the connect
    /// and leaves the reader disconnected.
    pub fn connect(&mut self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref();
        self.disconnect();

        let report = FormatValidator::new().inspect(path);
        if !report.valid {
            let reason = report
                .checks
                .iter()
                .find(|c| !c.passed)
                .and_then(|c| c.detail.clone())
                .unwrap_or_default();
            tracing::warn!(path = %path.display(), %reason, "not a valid recording");
            return Ok(false);
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.config.busy_timeout())?;

        if self.config.create_layout_table {
            if let Err(e) = conn.execute(CREATE_LAYOUTS_SQL, []) {
                tracing::warn!(error = %e, "could not create layouts table");
            }
        }

        let catalog = Catalog::load(&conn)?;

        tracing::info!(path = %path.display(), "recording opened");
        self.session = Some(Session { path: path.to_path_buf(), conn, catalog });
        Ok(true)
    }

    /// Release the connection. Safe to call repeatedly.
    pub fn disconnect(&mut self) -> bool {
        if let Some(session) = self.session.take() {
            tracing::debug!(path = %session.path.display(), "recording closed");
        }
        true
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.path.as_path())
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.session.as_ref().map(|s| &s.catalog)
    }

    /// Layout of the iteration table as it is now; the recorder may create
    /// it after the reader connects.
    pub fn generation(&self) -> Result<Option<SchemaGeneration>> {
        let Some(session) = &self.session else { return Ok(None) };
        SchemaGeneration::detect(&session.conn)
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Classified iteration records in table order.
    ///
    /// With `only_first` the result has at most one element.
    pub fn get_driver_iterations(&self, only_first: bool) -> Result<Vec<IterationRecord>> {
        let Some(session) = &self.session else { return Ok(Vec::new()) };
        let Some(generation) = SchemaGeneration::detect(&session.conn)? else {
            tracing::debug!("no iteration table with a known layout");
            return Ok(Vec::new());
        };

        let rows = decode_iterations(&session.conn, generation, Selector::from_only_first(only_first))?;
        Ok(assemble_all(rows, &session.catalog))
    }

    /// Every iteration record.
    pub fn get_driver_iteration_data(&self) -> Result<Vec<IterationRecord>> {
        self.get_driver_iterations(false)
    }

    /// The model-viewer payload as a zero- or one-element sequence.
    pub fn get_driver_metadata(&self) -> Result<Vec<DriverMetadataRecord>> {
        let Some(session) = &self.session else { return Ok(Vec::new()) };
        Ok(read_driver_metadata(&session.conn)?.into_iter().collect())
    }

    /// Name maps re-read from the metadata table.
    pub fn get_metadata(&self) -> Result<Option<VariableNames>> {
        let Some(session) = &self.session else { return Ok(None) };
        load_names(&session.conn).map(Some)
    }

    /// The stored layout as a zero- or one-element sequence.
    pub fn get_layout(&self) -> Result<Vec<Json>> {
        let Some(session) = &self.session else { return Ok(Vec::new()) };
        Ok(read_layout(&session.conn)?.into_iter().collect())
    }

    /// Replace the stored layout. `Ok(false)` when disconnected.
    pub fn set_layout(&self, document: &Json) -> Result<bool> {
        let Some(session) = &self.session else { return Ok(false) };
        write_layout(&session.conn, document)?;
        Ok(true)
    }

    /// True iff some iteration row has `counter > since`.
    pub fn is_new_data(&self, since: i64) -> Result<bool> {
        let Some(session) = &self.session else { return Ok(false) };
        if !table_exists(&session.conn, ITERATIONS_TABLE)? {
            return Ok(false);
        }
        let found: bool = session.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {ITERATIONS_TABLE} WHERE counter > ?1)"),
            [since],
            |row| row.get(0),
        )?;
        Ok(found)
    }
}

impl Drop for RecordingFile {
    fn drop(&mut self) {
        self.disconnect();
    }
}
