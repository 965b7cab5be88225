//! Crate-wide error type.
//!
//! Load-path failures (`Io`, `Parse`, `ColumnCount`) are recoverable: the
//! iteration protocol logs them and retries with a different file. The
//! remaining variants are fatal and surface to the caller unchanged.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FeederError>;

/// Errors produced by file selection, decoding, and batch iteration.
#[derive(Debug, Error)]
pub enum FeederError {
    /// Underlying I/O failure while reading a data file or directory.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read when the failure occurred.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cell could not be parsed as a number.
    #[error("{path}:{line}: cannot parse {value:?} as a number")]
    Parse {
        /// File containing the bad cell.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Offending cell text.
        value: String,
    },

    /// A row did not have the fixed column count of the schema.
    #[error("{path}:{line}: expected {expected} columns, found {found}")]
    ColumnCount {
        /// File containing the bad row.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Expected column count ([`crate::schema::TOTAL_COLUMNS`]).
        expected: usize,
        /// Actual column count.
        found: usize,
    },

    /// The data directory contains no eligible files.
    #[error("no eligible data files in {0}")]
    EmptyDirectory(PathBuf),

    /// The evaluation rotation ran past the end of the file list.
    #[error("file rotation exhausted: {visited} of {available} files visited")]
    FilesExhausted {
        /// Files whose unshifted pass has been selected.
        visited: usize,
        /// Total eligible files.
        available: usize,
    },

    /// The bounded reload retry loop gave up without a usable file.
    #[error("no usable file found after {attempts} load attempts")]
    RetriesExhausted {
        /// Number of selections tried.
        attempts: usize,
    },

    /// A logical batch index outside the current batch order. Caller bug.
    #[error("batch index {index} out of range for {num_batches} batches")]
    BatchIndexOutOfRange {
        /// Requested logical index.
        index: usize,
        /// Batches available in the current file.
        num_batches: usize,
    },

    /// Construction-time configuration validation failure.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FeederError {
    /// Whether the iteration protocol may recover by retrying another file.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FeederError::Io { .. } | FeederError::Parse { .. } | FeederError::ColumnCount { .. }
        )
    }
}
