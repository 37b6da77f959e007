//! Test-only npy encoder.

use super::header::MAGIC;

/// Build a version 1.0 preamble for `dict`, padded to a 64-byte boundary.
pub(crate) fn preamble(dict: &str) -> Vec<u8> {
    let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;

    let mut header = dict.to_string();
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes
}

fn shape_literal(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({n},)"),
        dims => format!(
            "({})",
            dims.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Builds structured `<f8` arrays the way `numpy.save` lays them out.
///
/// Values are given per field, record-major: record 0's elements first.
#[derive(Debug, Clone)]
pub(crate) struct NpyBuilder {
    fields: Vec<(String, Vec<usize>, Vec<f64>)>,
    shape: Vec<usize>,
}

impl NpyBuilder {
    pub(crate) fn new() -> Self {
        Self { fields: Vec::new(), shape: vec![1] }
    }

    pub(crate) fn shape(mut self, shape: &[usize]) -> Self {
        self.shape = shape.to_vec();
        self
    }

    pub(crate) fn scalar(self, name: &str, value: f64) -> Self {
        self.field(name, &[], &[value])
    }

    pub(crate) fn field(mut self, name: &str, subshape: &[usize], values: &[f64]) -> Self {
        self.fields.push((name.to_string(), subshape.to_vec(), values.to_vec()));
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let descr = self
            .fields
            .iter()
            .map(|(name, subshape, _)| {
                if subshape.is_empty() {
                    format!("('{name}', '<f8')")
                } else {
                    format!("('{name}', '<f8', {})", shape_literal(subshape))
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let dict = format!(
            "{{'descr': [{descr}], 'fortran_order': False, 'shape': {}, }}",
            shape_literal(&self.shape)
        );

        let mut bytes = preamble(&dict);
        let records: usize = self.shape.iter().product();
        for record in 0..records {
            for (_, subshape, values) in &self.fields {
                let per_record: usize = subshape.iter().product();
                for value in &values[record * per_record..(record + 1) * per_record] {
                    bytes.extend_from_slice(&value.to_le_bytes());
                }
            }
        }
        bytes
    }
}
