//! Response assembler: one normalized record per iteration.

use super::catalog::Catalog;
use super::classify::{classify, Groups, Variable};
use super::iterations::IterationRow;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// A classified iteration, in its serialized field order.
///
/// The five groups always serialize as arrays, empty when nothing was
/// recorded for them. `responses` is present only for pre-split recordings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    pub iteration_coordinate: String,
    pub timestamp: f64,
    pub success: i64,
    pub msg: String,
    pub counter: i64,
    pub desvars: Vec<Variable>,
    pub objectives: Vec<Variable>,
    pub constraints: Vec<Variable>,
    pub sysincludes: Vec<Variable>,
    pub inputs: Vec<Variable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<Variable>>,
}

impl IterationRecord {
    /// Merge a row's scalars with its classified groups.
    pub fn assemble(row: IterationRow, catalog: &Catalog) -> Self {
        let Groups { desvars, objectives, constraints, sysincludes, inputs, responses } =
            classify(&row.arrays, catalog);
        Self {
            iteration_coordinate: row.coordinate,
            timestamp: row.timestamp,
            success: row.success,
            msg: row.msg,
            counter: row.counter,
            desvars,
            objectives,
            constraints,
            sysincludes,
            inputs,
            responses,
        }
    }

    /// Recording time, `None` if the timestamp is out of range.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.floor();
        let nanos = ((self.timestamp - secs) * 1e9).round() as u32;
        if !secs.is_finite() || secs < i64::MIN as f64 || secs > i64::MAX as f64 {
            return None;
        }
        Utc.timestamp_opt(secs as i64, nanos.min(999_999_999)).single()
    }

    pub fn is_success(&self) -> bool {
        self.success != 0
    }

    /// Every variable with its group name, in serialized group order.
    pub fn variables(&self) -> impl Iterator<Item = (&'static str, &Variable)> {
        let groups: [(&'static str, &[Variable]); 5] = [
            ("desvars", &self.desvars),
            ("objectives", &self.objectives),
            ("constraints", &self.constraints),
            ("sysincludes", &self.sysincludes),
            ("inputs", &self.inputs),
        ];
        groups
            .into_iter()
            .chain(self.responses.as_deref().map(|r| ("responses", r)))
            .flat_map(|(group, vars)| vars.iter().map(move |v| (group, v)))
    }
}

/// Assemble rows into records with one catalog.
pub fn assemble_all(rows: Vec<IterationRow>, catalog: &Catalog) -> Vec<IterationRecord> {
    rows.into_iter().map(|row| IterationRecord::assemble(row, catalog)).collect()
}
