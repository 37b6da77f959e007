//! Collection-level access for a CRUD or presentation layer.
//!
//! Callers address data by collection name and always get a JSON array back,
//! so "nothing recorded yet" and "not connected" look the same.

use crate::error::Result;
use crate::recording::RecordingFile;
use serde::Serialize;
use serde_json::Value as Json;

/// Named collections a recording serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    DriverIterations,
    DriverMetadata,
    Layouts,
    Metadata,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::DriverIterations,
        Collection::DriverMetadata,
        Collection::Layouts,
        Collection::Metadata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::DriverIterations => "driver_iterations",
            Collection::DriverMetadata => "driver_metadata",
            Collection::Layouts => "layouts",
            Collection::Metadata => "metadata",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Collection::ALL.into_iter().find(|c| c.as_str() == s).ok_or_else(|| {
            let valid: Vec<_> = Collection::ALL.iter().map(Collection::as_str).collect();
            format!("Unknown collection: {s}. Valid collections: {}", valid.join(", "))
        })
    }
}

/// Read interface a CRUD layer programs against.
pub trait CaseSource {
    /// Every document of `collection` as a JSON array; with `get_many` unset
    /// at most the first one.
    fn generic_get(&self, collection: Collection, get_many: bool) -> Result<Json>;

    /// True iff an iteration newer than `since` exists.
    fn is_new_data(&self, since: i64) -> Result<bool>;

    /// Replace the stored layout.
    fn update_layout(&self, document: &Json) -> Result<bool>;
}

fn to_array<T: Serialize>(items: Vec<T>) -> Result<Json> {
    Ok(serde_json::to_value(items)?)
}

impl CaseSource for RecordingFile {
    fn generic_get(&self, collection: Collection, get_many: bool) -> Result<Json> {
        match collection {
            Collection::DriverIterations => to_array(self.get_driver_iterations(!get_many)?),
            Collection::DriverMetadata => to_array(self.get_driver_metadata()?),
            Collection::Layouts => to_array(self.get_layout()?),
            Collection::Metadata => to_array(self.get_metadata()?.into_iter().collect()),
        }
    }

    fn is_new_data(&self, since: i64) -> Result<bool> {
        RecordingFile::is_new_data(self, since)
    }

    fn update_layout(&self, document: &Json) -> Result<bool> {
        self.set_layout(document)
    }
}
