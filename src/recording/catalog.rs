//! Catalog decoder: name maps and per-variable role tags.

use super::pickle::{decode_column, dict_get, pickle_to_json, string_items, key_to_string, DecodePath};
use super::schema::{table_columns, METADATA_TABLE};
use crate::error::{RecordingError, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value as Json;
use serde_pickle::Value as PickleValue;
use std::collections::{BTreeSet, HashMap};

const CATALOG_COLUMNS: [&str; 3] = ["abs2prom", "prom2abs", "abs2meta"];

/// Role tags attached to one variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleTags(BTreeSet<String>);

impl RoleTags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }
}

/// Absolute/promoted name maps, as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableNames {
    pub abs2prom: Json,
    pub prom2abs: Json,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self { abs2prom: Json::Object(Default::default()), prom2abs: Json::Object(Default::default()) }
    }
}

/// Decoded catalog, loaded once per connection.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    names: VariableNames,
    roles: HashMap<String, RoleTags>,
    decode_paths: Vec<(&'static str, DecodePath)>,
}

impl Catalog {
    /// Catalog with no names and no tags; every output is unclassified.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog directly from role tags.
    pub fn from_roles<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = (String, RoleTags)>,
    {
        Self { roles: roles.into_iter().collect(), ..Self::default() }
    }

    /// Read the single metadata row.
    ///
    /// A missing table, missing row or NULL column leaves that part empty.
    /// A present column that neither decode path accepts is an error.
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut catalog = Catalog::empty();
        let Some(columns) = read_row(conn)? else {
            tracing::debug!("no metadata row, catalog is empty");
            return Ok(catalog);
        };

        for (column, decoded) in columns {
            catalog.decode_paths.push((column, decoded.path()));
            match decoded.path() {
                DecodePath::Legacy => {
                    tracing::warn!(column, "catalog column decoded through the legacy path")
                }
                path => tracing::debug!(column, %path, "catalog column decoded"),
            }
            let Some(value) = decoded.into_value() else { continue };
            match column {
                "abs2prom" => catalog.names.abs2prom = pickle_to_json(&value),
                "prom2abs" => catalog.names.prom2abs = pickle_to_json(&value),
                _ => catalog.roles = role_map(&value),
            }
        }

        tracing::debug!(tagged = catalog.roles.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Tags for `name`, empty when the variable is not catalogued.
    pub fn roles(&self, name: &str) -> RoleTags {
        self.roles.get(name).cloned().unwrap_or_default()
    }

    pub fn names(&self) -> &VariableNames {
        &self.names
    }

    /// Which decode path each present catalog column took.
    pub fn decode_paths(&self) -> &[(&'static str, DecodePath)] {
        &self.decode_paths
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Re-read only the name maps.
pub(crate) fn load_names(conn: &Connection) -> Result<VariableNames> {
    let mut names = VariableNames::default();
    let Some(columns) = read_row(conn)? else {
        return Ok(names);
    };
    for (column, decoded) in columns {
        let Some(value) = decoded.into_value() else { continue };
        match column {
            "abs2prom" => names.abs2prom = pickle_to_json(&value),
            "prom2abs" => names.prom2abs = pickle_to_json(&value),
            _ => {}
        }
    }
    Ok(names)
}

type DecodedColumns = Vec<(&'static str, super::pickle::CatalogDecode<PickleValue>)>;

fn read_row(conn: &Connection) -> Result<Option<DecodedColumns>> {
    let present = table_columns(conn, METADATA_TABLE)?;
    let columns: Vec<&'static str> = CATALOG_COLUMNS
        .iter()
        .copied()
        .filter(|c| present.iter().any(|p| p == c))
        .collect();
    if columns.is_empty() {
        return Ok(None);
    }

    let sql = format!("SELECT {} FROM {METADATA_TABLE} LIMIT 1", columns.join(", "));
    let row = conn
        .query_row(&sql, [], |row| {
            let mut decoded = Vec::with_capacity(columns.len());
            for (idx, column) in columns.iter().enumerate() {
                decoded.push((*column, decode_column(row.get_ref(idx)?)));
            }
            Ok(decoded)
        })
        .optional()?;

    let Some(row) = row else { return Ok(None) };
    row.into_iter()
        .map(|(column, result)| {
            result
                .map(|decoded| (column, decoded))
                .map_err(|message| RecordingError::CatalogDecode { column: column.to_string(), message })
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn role_map(abs2meta: &PickleValue) -> HashMap<String, RoleTags> {
    let PickleValue::Dict(entries) = abs2meta else {
        return HashMap::new();
    };
    entries
        .iter()
        .map(|(name, meta)| {
            let tags = dict_get(meta, "type").map(string_items).unwrap_or_default();
            (key_to_string(name), RoleTags::new(tags))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_pickle::{HashableValue, SerOptions};
    use std::collections::BTreeMap;

    fn meta_with_type(ty: PickleValue) -> PickleValue {
        let mut meta = BTreeMap::new();
        meta.insert(HashableValue::String("type".into()), ty);
        meta.insert(HashableValue::String("units".into()), PickleValue::None);
        PickleValue::Dict(meta)
    }

    #[test]
    fn test_role_map_accepts_string_and_sequence_types() {
        let mut abs2meta = BTreeMap::new();
        abs2meta.insert(
            HashableValue::String("p.x".into()),
            meta_with_type(PickleValue::List(vec![
                PickleValue::String("output".into()),
                PickleValue::String("desvar".into()),
            ])),
        );
        abs2meta.insert(
            HashableValue::Bytes(b"p.f".to_vec()),
            meta_with_type(PickleValue::Bytes(b"objective".to_vec())),
        );
        abs2meta.insert(HashableValue::String("p.y".into()), PickleValue::I64(0));

        let roles = role_map(&PickleValue::Dict(abs2meta));
        assert!(roles["p.x"].contains("desvar"));
        assert!(roles["p.f"].contains("objective"));
        assert_eq!(roles["p.y"], RoleTags::default());
    }

    #[test]
    fn test_load_without_metadata_table() {
        let conn = Connection::open_in_memory().unwrap();
        let catalog = Catalog::load(&conn).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.decode_paths().is_empty());
        assert_eq!(catalog.names(), &VariableNames::default());
    }

    #[test]
    fn test_load_two_column_variant() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE metadata (abs2prom BLOB, prom2abs BLOB)").unwrap();
        let mut map = BTreeMap::new();
        map.insert(HashableValue::String("c.x".into()), PickleValue::String("x".into()));
        let blob = serde_pickle::value_to_vec(&PickleValue::Dict(map), SerOptions::new()).unwrap();
        conn.execute("INSERT INTO metadata VALUES (?1, NULL)", [blob]).unwrap();

        let catalog = Catalog::load(&conn).unwrap();
        assert_eq!(catalog.names().abs2prom, serde_json::json!({"c.x": "x"}));
        assert_eq!(catalog.names().prom2abs, serde_json::json!({}));
        assert_eq!(
            catalog.decode_paths(),
            &[("abs2prom", DecodePath::Current), ("prom2abs", DecodePath::Absent)]
        );
    }

    #[test]
    fn test_corrupt_column_names_the_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE metadata (abs2prom BLOB, prom2abs BLOB, abs2meta BLOB)")
            .unwrap();
        conn.execute("INSERT INTO metadata VALUES (NULL, NULL, ?1)", [b"\x00garbage".to_vec()])
            .unwrap();

        match Catalog::load(&conn) {
            Err(RecordingError::CatalogDecode { column, .. }) => assert_eq!(column, "abs2meta"),
            other => panic!("expected CatalogDecode, got {other:?}"),
        }
    }
}
