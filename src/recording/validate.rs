//! Recording file format validation.
//!
//! Runs before any connection is opened: a file that fails here is never
//! handed to SQLite.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Size of the SQLite database header.
pub const HEADER_SIZE: usize = 100;

/// Magic string at the start of every SQLite 3 database file.
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\x00";

/// A validation check that was performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCheck {
    /// Check name
    pub name: &'static str,
    /// Whether check passed
    pub passed: bool,
    /// What was found when the check failed
    pub detail: Option<String>,
}

/// Outcome of validating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatReport {
    pub valid: bool,
    pub checks: Vec<FormatCheck>,
}

impl FormatReport {
    /// Format as human-readable report.
    pub fn to_report(&self) -> String {
        let mut report = format!(
            "Format Validation: {}\n\nChecks Performed:\n",
            if self.valid { "PASS" } else { "FAIL" }
        );
        for check in &self.checks {
            let status = if check.passed { "✓" } else { "✗" };
            report.push_str(&format!("  {status} {}\n", check.name));
            if let Some(detail) = &check.detail {
                report.push_str(&format!("    → {detail}\n"));
            }
        }
        report
    }
}

/// Checks that a path holds a SQLite 3 database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatValidator;

impl FormatValidator {
    pub fn new() -> Self {
        Self
    }

    /// Run every check, stopping at the first failure.
    pub fn inspect(&self, path: &Path) -> FormatReport {
        let mut checks = Vec::with_capacity(3);

        let is_file = path.is_file();
        checks.push(FormatCheck {
            name: "Regular file exists",
            passed: is_file,
            detail: (!is_file).then(|| format!("{} is missing or not a file", path.display())),
        });
        if !is_file {
            return FormatReport { valid: false, checks };
        }

        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let big_enough = size >= HEADER_SIZE as u64;
        checks.push(FormatCheck {
            name: "Header size",
            passed: big_enough,
            detail: (!big_enough)
                .then(|| format!("{size} bytes, a SQLite header needs {HEADER_SIZE}")),
        });
        if !big_enough {
            return FormatReport { valid: false, checks };
        }

        let magic_check = match read_header(path) {
            Ok(header) if header.starts_with(SQLITE_MAGIC) => {
                FormatCheck { name: "Magic signature", passed: true, detail: None }
            }
            Ok(header) => FormatCheck {
                name: "Magic signature",
                passed: false,
                detail: Some(format!(
                    "found {:?}",
                    String::from_utf8_lossy(&header[..SQLITE_MAGIC.len()])
                )),
            },
            Err(e) => FormatCheck {
                name: "Magic signature",
                passed: false,
                detail: Some(format!("cannot read header: {e}")),
            },
        };
        let valid = magic_check.passed;
        checks.push(magic_check);

        FormatReport { valid, checks }
    }

    /// Boolean form of [`FormatValidator::inspect`].
    pub fn is_valid(&self, path: &Path) -> bool {
        self.inspect(path).valid
    }
}

fn read_header(path: &Path) -> std::io::Result<[u8; HEADER_SIZE]> {
    let mut header = [0u8; HEADER_SIZE];
    File::open(path)?.read_exact(&mut header)?;
    Ok(header)
}

/// Return true if `path` names a valid SQLite 3 database file.
pub fn is_valid_recording(path: impl AsRef<Path>) -> bool {
    FormatValidator::new().is_valid(path.as_ref())
}
