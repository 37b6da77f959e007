//! Decoded arrays and the named-column interface.

use super::dtype::{empty_extent_ok, Dtype, Field, ScalarType, Schema, MAX_EMPTY_ITEMS};
use super::error::NpyError;
use super::header::{parse_header, NpyHeader};
use super::value::FieldValue;

/// Access to the named columns of a structured buffer.
///
/// Field names and kinds are discovered at runtime, so consumers look
/// columns up by name instead of through static struct fields.
pub trait NamedColumns {
    /// Field names in declaration order.
    fn names(&self) -> Vec<&str>;

    /// The column for `name`, shaped `outer_shape + subshape`.
    fn column(&self, name: &str) -> Option<FieldValue>;
}

/// A decoded npy buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum NpyArray {
    /// Plain numeric array.
    Numeric { shape: Vec<usize>, ty: ScalarType, data: Vec<u8> },
    /// Structured (record) array.
    Structured(StructuredArray),
    /// Object array; `pickle` holds the pickled array payload.
    Object { shape: Vec<usize>, pickle: Vec<u8> },
}

impl NpyArray {
    /// Decode a complete npy buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self, NpyError> {
        let header = parse_header(bytes)?;
        let body = &bytes[header.data_offset..];
        let len = header
            .element_count()
            .filter(|_| empty_extent_ok(&header.shape))
            .ok_or_else(|| NpyError::Header {
                message: format!("shape {:?} is too large", header.shape),
            })?;

        let NpyHeader { dtype, shape, .. } = header;
        match dtype {
            Dtype::Object => Ok(NpyArray::Object { shape, pickle: body.to_vec() }),
            Dtype::Scalar(ty) => {
                check_length(body, len, ty.size())?;
                Ok(NpyArray::Numeric { shape, ty, data: body.to_vec() })
            }
            Dtype::Record(schema) => {
                if schema.record_size() == 0 && len > MAX_EMPTY_ITEMS {
                    return Err(NpyError::Header {
                        message: format!("{len} zero-sized records"),
                    });
                }
                check_length(body, len, schema.record_size())?;
                Ok(NpyArray::Structured(StructuredArray { schema, shape, len, data: body.to_vec() }))
            }
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            NpyArray::Numeric { shape, .. } | NpyArray::Object { shape, .. } => shape,
            NpyArray::Structured(array) => array.shape(),
        }
    }

    /// Numeric contents as a nested value (`tolist()` equivalent).
    pub fn to_value(&self) -> Option<FieldValue> {
        match self {
            NpyArray::Numeric { shape, ty, data } => {
                let mut items = data.chunks_exact(ty.size()).map(|chunk| ty.read(chunk));
                Some(FieldValue::nest(&mut items, shape))
            }
            _ => None,
        }
    }
}

/// `body` must hold exactly `count` items of `item_size` bytes.
fn check_length(body: &[u8], count: usize, item_size: usize) -> Result<(), NpyError> {
    let expected = count.checked_mul(item_size).ok_or_else(|| NpyError::Header {
        message: format!("{count} items of {item_size} bytes overflow"),
    })?;
    if body.len() != expected {
        return Err(NpyError::LengthMismatch { expected, actual: body.len() });
    }
    Ok(())
}

/// A structured array: records of named, typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredArray {
    schema: Schema,
    shape: Vec<usize>,
    /// Record count, checked against `data` at decode time.
    len: usize,
    data: Vec<u8>,
}

impl StructuredArray {
    /// Decode a buffer that must hold a structured array.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NpyError> {
        match NpyArray::decode(bytes)? {
            NpyArray::Structured(array) => Ok(array),
            NpyArray::Numeric { ty, .. } => {
                Err(NpyError::NotStructured { descr: format!("{:?}", ty.kind) })
            }
            NpyArray::Object { .. } => Err(NpyError::NotStructured { descr: "object".to_string() }),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn field_value(&self, field: &Field) -> FieldValue {
        let record_size = self.schema.record_size();
        let elem_size = field.ty.size();
        // Schema construction rejects fields whose size overflows.
        let per_record = field.element_count().unwrap_or(0);

        let mut records = (0..self.len()).map(|idx| {
            let start = idx * record_size + field.offset;
            let mut elems = (0..per_record).map(|j| {
                let at = start + j * elem_size;
                field.ty.read(&self.data[at..at + elem_size])
            });
            FieldValue::nest(&mut elems, &field.subshape)
        });
        FieldValue::nest(&mut records, &self.shape)
    }
}

impl NamedColumns for StructuredArray {
    fn names(&self) -> Vec<&str> {
        self.schema.fields().iter().map(|f| f.name.as_str()).collect()
    }

    fn column(&self, name: &str) -> Option<FieldValue> {
        self.schema.field(name).map(|field| self.field_value(field))
    }
}
