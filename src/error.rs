// error.rs - Error taxonomy for header resolution and merging

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status used when the command line itself is wrong.
pub const EXIT_USAGE: i32 = 1;
/// Exit status used when an input file cannot be opened or read.
pub const EXIT_UNREADABLE: i32 = 2;
pub const EXIT_MALFORMED_HEADER: i32 = 3;
pub const EXIT_ROW_WIDTH: i32 = 4;
pub const EXIT_OUTPUT: i32 = 5;
pub const EXIT_CONFIG: i32 = 6;

/// Every way a merge run can fail.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot find/read '{}': {reason}", .path.display())]
    FileUnreadable { path: PathBuf, reason: String },

    #[error("malformed header in '{}': {reason}", .path.display())]
    MalformedHeader { path: PathBuf, reason: String },

    #[error(
        "'{}' line {line} has {found} fields, expected {expected} (from its header)",
        .path.display()
    )]
    RowWidthMismatch {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("failed to read '{}' at line {line}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize output chunk: {0}")]
    Serialize(#[from] csv::Error),

    #[error("write error: {0}")]
    Output(#[source] io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MergeError>;

impl MergeError {
    /// Process exit status for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            MergeError::Usage(_) => EXIT_USAGE,
            MergeError::FileUnreadable { .. } | MergeError::ReadFailed { .. } => EXIT_UNREADABLE,
            MergeError::MalformedHeader { .. } => EXIT_MALFORMED_HEADER,
            MergeError::RowWidthMismatch { .. } => EXIT_ROW_WIDTH,
            MergeError::Serialize(_) | MergeError::Output(_) => EXIT_OUTPUT,
            MergeError::Config(_) => EXIT_CONFIG,
        }
    }

    /// True when the downstream reader went away (e.g. `| head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, MergeError::Output(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        MergeError::FileUnreadable {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MergeError::MalformedHeader {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
