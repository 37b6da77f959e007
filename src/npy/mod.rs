//! NumPy `.npy` buffer decoding.
//!
//! Recorders store every array column as a complete npy buffer. The record
//! layout (field names, scalar kinds, sub-array shapes) differs between
//! recordings and is discovered from each buffer's header.
//!
//! # Example
//!
//! ```ignore
//! use caserec::npy::{NamedColumns, StructuredArray};
//!
//! let array = StructuredArray::from_bytes(&blob)?;
//! for name in array.names() {
//!     println!("{name}: {:?}", array.column(name));
//! }
//! ```

mod array;
mod dtype;
mod error;
mod header;
mod literal;
mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use array::{NamedColumns, NpyArray, StructuredArray};
pub use dtype::{ByteOrder, Dtype, Field, ScalarKind, ScalarType, Schema};
pub use error::NpyError;
pub use header::{has_magic, parse_header, NpyHeader, MAGIC};
pub use value::FieldValue;
