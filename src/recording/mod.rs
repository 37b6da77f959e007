//! Case recording reader.
//!
//! A recording is a SQLite file written by an optimization driver's case
//! recorder. Reading one goes through the stages below, leaf-first:
//!
//! - [`validate`]: header check before any connection is opened
//! - [`catalog`]: name maps and role tags, decoded once per connection
//! - [`iterations`]: iteration rows with their npy array columns decoded
//! - [`classify`]: each output field assigned to exactly one group
//! - [`assemble`]: scalars and groups merged into an [`IterationRecord`]
//!
//! [`RecordingFile`] owns the connection and exposes the operations.

pub mod assemble;
pub mod catalog;
pub mod classify;
mod file;
pub mod iterations;
mod layout;
mod metadata;
pub mod pickle;
pub mod schema;
pub mod validate;

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

pub use assemble::IterationRecord;
pub use catalog::{Catalog, RoleTags, VariableNames};
pub use classify::{Role, Variable};
pub use file::RecordingFile;
pub use metadata::DriverMetadataRecord;
pub use pickle::{CatalogDecode, DecodePath};
pub use schema::SchemaGeneration;
pub use validate::{is_valid_recording, FormatCheck, FormatReport, FormatValidator};
