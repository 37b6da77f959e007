//! # caserec
//!
//! Reader for SQLite case recordings written by optimization drivers.
//!
//! A [`RecordingFile`] validates the file header, opens one connection,
//! decodes the pickled variable catalog once, and then serves classified
//! iteration records, driver metadata and a persisted UI layout. Reads on a
//! disconnected reader return empty results.
//!
//! ```no_run
//! use caserec::RecordingFile;
//!
//! let mut recording = RecordingFile::new();
//! if recording.connect("cases.sql")? {
//!     for record in recording.get_driver_iterations(false)? {
//!         println!("{} desvars={}", record.counter, record.desvars.len());
//!     }
//! }
//! # Ok::<(), caserec::RecordingError>(())
//! ```

pub mod cli;
pub mod collections;
pub mod config;
pub mod error;
pub mod npy;
pub mod recording;

pub use collections::{CaseSource, Collection};
pub use config::{load_config, OutputFormat, ReaderConfig};
pub use error::{RecordingError, Result};
pub use recording::{
    is_valid_recording, DriverMetadataRecord, IterationRecord, RecordingFile, Role, Variable,
    VariableNames,
};
