//! Tests for the recording reader.
//!
//! Every test builds a real recording file on disk through `fixtures`.

mod catalog_tests;
mod iteration_tests;
