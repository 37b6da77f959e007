//! npy preamble and header parsing

use super::dtype::{checked_product, Dtype};
use super::error::NpyError;
use super::literal::{self, PyLiteral};

/// Magic prefix of every npy buffer.
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Read a little-endian u16 at `pos`.
pub(super) fn read_u16_le(data: &[u8], pos: usize) -> Result<u16, NpyError> {
    let bytes: [u8; 2] = data
        .get(pos..pos + 2)
        .and_then(|s| s.try_into().ok())
        .ok_or(NpyError::Truncated { offset: pos })?;
    Ok(u16::from_le_bytes(bytes))
}

/// Read a little-endian u32 at `pos`.
pub(super) fn read_u32_le(data: &[u8], pos: usize) -> Result<u32, NpyError> {
    let bytes: [u8; 4] = data
        .get(pos..pos + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or(NpyError::Truncated { offset: pos })?;
    Ok(u32::from_le_bytes(bytes))
}

/// Parsed npy header.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyHeader {
    pub version: (u8, u8),
    pub dtype: Dtype,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
    /// Offset of the first data byte.
    pub data_offset: usize,
}

impl NpyHeader {
    /// Items described by `shape`; `None` if the product overflows.
    pub fn element_count(&self) -> Option<usize> {
        checked_product(&self.shape)
    }
}

/// Check whether a buffer starts with the npy magic.
pub fn has_magic(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

/// Parse and validate the preamble and header dict.
pub fn parse_header(data: &[u8]) -> Result<NpyHeader, NpyError> {
    if data.len() < 10 {
        return Err(NpyError::Truncated { offset: data.len() });
    }
    if !has_magic(data) {
        return Err(NpyError::BadMagic { found: data[..6].to_vec() });
    }

    let (major, minor) = (data[6], data[7]);
    let (header_len, header_start) = match major {
        1 => (read_u16_le(data, 8)? as usize, 10),
        2 | 3 => (read_u32_le(data, 8)? as usize, 12),
        _ => return Err(NpyError::UnsupportedVersion { major, minor }),
    };

    let data_offset = header_start + header_len;
    let raw = data
        .get(header_start..data_offset)
        .ok_or(NpyError::Truncated { offset: header_start })?;
    // Version 1/2 headers are latin-1; anything outside ASCII is never valid here.
    let text = std::str::from_utf8(raw)
        .map_err(|_| NpyError::Header { message: "header is not valid text".to_string() })?;

    let dict = literal::parse(text.trim_end_matches(['\n', ' ', '\0']))?;
    if !matches!(dict, PyLiteral::Dict(_)) {
        return Err(NpyError::Header { message: "header is not a dict".to_string() });
    }

    let descr = dict
        .get("descr")
        .ok_or_else(|| NpyError::Header { message: "missing 'descr'".to_string() })?;
    let dtype = Dtype::from_descr(descr)?;

    let fortran_order = match dict.get("fortran_order") {
        Some(PyLiteral::Bool(b)) => *b,
        Some(_) => {
            return Err(NpyError::Header { message: "'fortran_order' must be a bool".to_string() })
        }
        None => false,
    };

    let shape = dict
        .get("shape")
        .and_then(PyLiteral::as_shape)
        .ok_or_else(|| NpyError::Header { message: "missing or invalid 'shape'".to_string() })?;

    if fortran_order && shape.len() > 1 {
        return Err(NpyError::Header {
            message: format!("fortran-ordered arrays of rank {} are not supported", shape.len()),
        });
    }

    Ok(NpyHeader { version: (major, minor), dtype, fortran_order, shape, data_offset })
}
