//! Runtime dtype descriptions decoded from npy headers.

use super::error::NpyError;
use super::literal::PyLiteral;
use super::value::FieldValue;

/// Byte order of a multi-byte scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}

/// Numeric scalar kinds a field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl ScalarKind {
    pub fn size(&self) -> usize {
        match *self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    fn from_code(kind: char, size: usize) -> Option<Self> {
        match (kind, size) {
            ('b', 1) => Some(Self::Bool),
            ('i', 1) => Some(Self::Int8),
            ('i', 2) => Some(Self::Int16),
            ('i', 4) => Some(Self::Int32),
            ('i', 8) => Some(Self::Int64),
            ('u', 1) => Some(Self::UInt8),
            ('u', 2) => Some(Self::UInt16),
            ('u', 4) => Some(Self::UInt32),
            ('u', 8) => Some(Self::UInt64),
            ('f', 4) => Some(Self::Float32),
            ('f', 8) => Some(Self::Float64),
            _ => None,
        }
    }
}

/// A scalar kind together with its byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarType {
    pub kind: ScalarKind,
    pub order: ByteOrder,
}

impl ScalarType {
    pub fn size(&self) -> usize {
        self.kind.size()
    }

    /// Decode one scalar; `bytes` must hold exactly `self.size()` bytes.
    pub fn read(&self, bytes: &[u8]) -> FieldValue {
        macro_rules! num {
            ($t:ty) => {{
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                match self.order {
                    ByteOrder::Little => <$t>::from_le_bytes(buf),
                    ByteOrder::Big => <$t>::from_be_bytes(buf),
                }
            }};
        }

        match self.kind {
            ScalarKind::Bool => FieldValue::Bool(bytes[0] != 0),
            ScalarKind::Int8 => FieldValue::Int(i64::from(num!(i8))),
            ScalarKind::Int16 => FieldValue::Int(i64::from(num!(i16))),
            ScalarKind::Int32 => FieldValue::Int(i64::from(num!(i32))),
            ScalarKind::Int64 => FieldValue::Int(num!(i64)),
            ScalarKind::UInt8 => FieldValue::UInt(u64::from(num!(u8))),
            ScalarKind::UInt16 => FieldValue::UInt(u64::from(num!(u16))),
            ScalarKind::UInt32 => FieldValue::UInt(u64::from(num!(u32))),
            ScalarKind::UInt64 => FieldValue::UInt(num!(u64)),
            ScalarKind::Float32 => FieldValue::Float(f64::from(num!(f32))),
            ScalarKind::Float64 => FieldValue::Float(num!(f64)),
        }
    }
}

/// One element of a type string: a scalar, raw padding, or a Python object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    Scalar(ScalarType),
    Void(usize),
    Object,
}

/// Parse a numpy type string such as `<f8`, `|b1`, `>i4`, `|V4` or `|O`.
pub fn parse_typestr(descr: &str) -> Result<TypeCode, NpyError> {
    let unsupported = || NpyError::UnsupportedDtype { descr: descr.to_string() };

    let (order, rest) = match descr.as_bytes().first() {
        Some(b'<') => (ByteOrder::Little, &descr[1..]),
        Some(b'>') => (ByteOrder::Big, &descr[1..]),
        Some(b'|') | Some(b'=') => (ByteOrder::native(), &descr[1..]),
        _ => (ByteOrder::native(), descr),
    };

    let mut chars = rest.chars();
    let kind = chars.next().ok_or_else(unsupported)?;
    let digits = chars.as_str();

    if kind == 'O' {
        return Ok(TypeCode::Object);
    }
    let size: usize = digits.parse().map_err(|_| unsupported())?;
    if kind == 'V' {
        return Ok(TypeCode::Void(size));
    }
    ScalarKind::from_code(kind, size)
        .map(|kind| TypeCode::Scalar(ScalarType { kind, order }))
        .ok_or_else(unsupported)
}

/// A named field of a structured dtype.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: ScalarType,
    /// Per-record sub-array shape; empty for scalar fields.
    pub subshape: Vec<usize>,
    /// Byte offset of the field inside one record.
    pub offset: usize,
}

impl Field {
    /// Scalars per record; `None` if the sub-shape overflows.
    pub fn element_count(&self) -> Option<usize> {
        checked_product(&self.subshape)
    }

    /// Bytes per record; `None` on overflow.
    pub fn size(&self) -> Option<usize> {
        self.element_count()?.checked_mul(self.ty.size())
    }
}

/// Product of `dims`, `None` on overflow.
pub(crate) fn checked_product(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Upper bound on values built from no data: dims before a zero extent, or
/// records of a zero-sized dtype.
pub(crate) const MAX_EMPTY_ITEMS: usize = 1 << 16;

/// Whether a shape with a zero extent stays within [`MAX_EMPTY_ITEMS`].
pub(crate) fn empty_extent_ok(dims: &[usize]) -> bool {
    match dims.iter().position(|&d| d == 0) {
        Some(zero) => checked_product(&dims[..zero]).is_some_and(|n| n <= MAX_EMPTY_ITEMS),
        None => true,
    }
}

fn too_large(name: &str) -> NpyError {
    NpyError::Header { message: format!("size of field '{name}' overflows") }
}

/// The ordered field list of a structured dtype, discovered from the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
    record_size: usize,
}

impl Schema {
    /// Build a schema from a `descr` list such as
    /// `[('x', '<f8'), ('y', '<i4', (2,)), ('', '|V4')]`.
    pub fn from_descr(items: &[PyLiteral]) -> Result<Self, NpyError> {
        let mut fields = Vec::with_capacity(items.len());
        let mut offset = 0usize;

        for item in items {
            let parts = item.as_seq().ok_or_else(|| NpyError::Header {
                message: "descr entries must be tuples".to_string(),
            })?;
            let (name, typestr) = match parts {
                [name, PyLiteral::Str(typestr), ..] => (field_name(name)?, typestr.as_str()),
                [_, PyLiteral::List(_), ..] => {
                    return Err(NpyError::UnsupportedDtype { descr: "nested record".to_string() })
                }
                _ => {
                    return Err(NpyError::Header {
                        message: "descr entry needs a name and a type".to_string(),
                    })
                }
            };
            let subshape = match parts.get(2) {
                Some(shape) => shape.as_shape().ok_or_else(|| NpyError::Header {
                    message: format!("invalid sub-array shape for field '{name}'"),
                })?,
                None => Vec::new(),
            };
            if !empty_extent_ok(&subshape) {
                return Err(too_large(&name));
            }

            match parse_typestr(typestr)? {
                TypeCode::Scalar(ty) => {
                    let field = Field { name, ty, subshape, offset };
                    offset = field
                        .size()
                        .and_then(|size| offset.checked_add(size))
                        .ok_or_else(|| too_large(&field.name))?;
                    fields.push(field);
                }
                TypeCode::Void(size) if name.is_empty() => {
                    offset = checked_product(&subshape)
                        .and_then(|count| count.checked_mul(size))
                        .and_then(|bytes| offset.checked_add(bytes))
                        .ok_or_else(|| too_large("padding"))?;
                }
                TypeCode::Void(_) | TypeCode::Object => {
                    return Err(NpyError::UnsupportedDtype { descr: typestr.to_string() })
                }
            }
        }

        Ok(Self { fields, record_size: offset })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Bytes per record, padding included.
    pub fn record_size(&self) -> usize {
        self.record_size
    }
}

/// Field names are plain strings or `(title, name)` pairs.
fn field_name(lit: &PyLiteral) -> Result<String, NpyError> {
    match lit {
        PyLiteral::Str(s) => Ok(s.clone()),
        PyLiteral::Tuple(pair) if pair.len() == 2 => pair[1]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| NpyError::Header { message: "invalid titled field name".to_string() }),
        _ => Err(NpyError::Header { message: "field name must be a string".to_string() }),
    }
}

/// The element type of a whole array.
#[derive(Debug, Clone, PartialEq)]
pub enum Dtype {
    Scalar(ScalarType),
    Record(Schema),
    Object,
}

impl Dtype {
    pub fn from_descr(descr: &PyLiteral) -> Result<Self, NpyError> {
        match descr {
            PyLiteral::Str(typestr) => match parse_typestr(typestr)? {
                TypeCode::Scalar(ty) => Ok(Dtype::Scalar(ty)),
                TypeCode::Object => Ok(Dtype::Object),
                TypeCode::Void(_) => {
                    Err(NpyError::UnsupportedDtype { descr: typestr.to_string() })
                }
            },
            PyLiteral::List(items) => Schema::from_descr(items).map(Dtype::Record),
            _ => Err(NpyError::Header { message: "descr must be a string or a list".to_string() }),
        }
    }

    /// Item size in bytes; object arrays have no fixed item size.
    pub fn item_size(&self) -> Option<usize> {
        match self {
            Dtype::Scalar(ty) => Some(ty.size()),
            Dtype::Record(schema) => Some(schema.record_size()),
            Dtype::Object => None,
        }
    }
}
