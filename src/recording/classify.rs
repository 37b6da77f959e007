//! Variable classifier: assigns each recorded field to one output group.

use super::catalog::{Catalog, RoleTags};
use super::iterations::RowArrays;
use crate::npy::{FieldValue, NamedColumns, StructuredArray};
use serde::Serialize;

/// Semantic role of an output variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Desvar,
    Objective,
    Constraint,
    Sysinclude,
}

impl Role {
    /// Tagged roles in tie-break order; the first match wins.
    pub const PRIORITY: [Role; 3] = [Role::Desvar, Role::Objective, Role::Constraint];

    pub fn tag(&self) -> &'static str {
        match self {
            Role::Desvar => "desvar",
            Role::Objective => "objective",
            Role::Constraint => "constraint",
            Role::Sysinclude => "sysinclude",
        }
    }

    /// Role for a tag set; untagged variables fall through to `Sysinclude`.
    pub fn from_tags(tags: &RoleTags) -> Role {
        Role::PRIORITY
            .into_iter()
            .find(|role| tags.contains(role.tag()))
            .unwrap_or(Role::Sysinclude)
    }
}

/// One named variable and its recorded values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub values: FieldValue,
}

/// Output groups of one iteration, each in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Groups {
    pub desvars: Vec<Variable>,
    pub objectives: Vec<Variable>,
    pub constraints: Vec<Variable>,
    pub sysincludes: Vec<Variable>,
    pub inputs: Vec<Variable>,
    /// Only pre-split recordings store responses.
    pub responses: Option<Vec<Variable>>,
}

impl Groups {
    fn push(&mut self, role: Role, variable: Variable) {
        match role {
            Role::Desvar => self.desvars.push(variable),
            Role::Objective => self.objectives.push(variable),
            Role::Constraint => self.constraints.push(variable),
            Role::Sysinclude => self.sysincludes.push(variable),
        }
    }
}

/// Every field of `array`, values shaped by `wrap`.
fn variables(array: Option<&StructuredArray>, wrap: fn(FieldValue) -> FieldValue) -> Vec<Variable> {
    let Some(array) = array else { return Vec::new() };
    array
        .names()
        .into_iter()
        .filter_map(|name| {
            array.column(name).map(|values| Variable { name: name.to_string(), values: wrap(values) })
        })
        .collect()
}

fn first_element(values: FieldValue) -> FieldValue {
    values.into_first()
}

fn full_column(values: FieldValue) -> FieldValue {
    values
}

/// Partition one row's arrays into output groups.
///
/// Unified recordings classify `outputs` through the catalog and unwrap each
/// value to its first record. Pre-split recordings map each stored array to
/// its like-named group and keep the full column.
pub fn classify(arrays: &RowArrays, catalog: &Catalog) -> Groups {
    match arrays {
        RowArrays::Unified { inputs, outputs } => {
            let mut groups = Groups {
                inputs: variables(inputs.as_ref(), first_element),
                ..Groups::default()
            };
            for variable in variables(outputs.as_ref(), first_element) {
                let role = Role::from_tags(&catalog.roles(&variable.name));
                groups.push(role, variable);
            }
            groups
        }
        RowArrays::PreSplit { desvars, responses, objectives, constraints, sysincludes } => Groups {
            desvars: variables(desvars.as_ref(), full_column),
            objectives: variables(objectives.as_ref(), full_column),
            constraints: variables(constraints.as_ref(), full_column),
            sysincludes: variables(sysincludes.as_ref(), full_column),
            inputs: Vec::new(),
            responses: Some(variables(responses.as_ref(), full_column)),
        },
    }
}
