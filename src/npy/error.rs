//! npy decoding errors

use thiserror::Error;

/// Errors raised while decoding an npy buffer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NpyError {
    #[error("buffer truncated at byte offset {offset}")]
    Truncated { offset: usize },

    #[error("invalid npy magic: expected '\\x93NUMPY', got {found:?}")]
    BadMagic { found: Vec<u8> },

    #[error("unsupported npy version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("invalid npy header: {message}")]
    Header { message: String },

    #[error("unsupported dtype '{descr}'")]
    UnsupportedDtype { descr: String },

    #[error("expected a structured array, found dtype {descr}")]
    NotStructured { descr: String },

    #[error("data length {actual} does not match header (expected {expected} bytes)")]
    LengthMismatch { expected: usize, actual: usize },
}
