//! Custom error types for the stars-reader crate.
//!
//! Every variant aborts the whole decode. A single misaligned read corrupts
//! every value decoded after it, so there is no partial result to salvage.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum StarsError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The index stream is structurally broken: a multi-line record never
    /// reached its terminator, or a fixed-length table ran out of lines.
    #[error("Malformed index stream at line {line}: {reason}")]
    MalformedIndex { line: usize, reason: String },

    /// An inline token could not be parsed as the number its record requires.
    #[error("Invalid {field} in {keyword} record at line {line}: {value:?}")]
    InvalidField {
        line: usize,
        keyword: String,
        field: &'static str,
        value: String,
    },

    /// The binary stream ended before a declared block was fully read, or a
    /// block cannot be split into whole float64 values.
    #[error("Truncated binary payload ({context}) at offset {offset}: expected {expected} bytes, found {found}")]
    TruncatedBinary {
        context: String,
        offset: u64,
        expected: u64,
        found: u64,
    },

    /// A recognized record's payload size disagrees with the caller-supplied
    /// width. This points at a template/configuration mismatch, not at a
    /// corrupted stream.
    #[error("Record width mismatch for {record} {field}: configured {expected} values, found {found}")]
    RecordWidthMismatch {
        record: &'static str,
        field: String,
        expected: usize,
        found: u64,
    },

    /// The index stream was exhausted while unread bytes remained in the
    /// binary stream.
    #[error("Stream desync: index exhausted with {trailing} unread payload bytes at offset {offset}")]
    StreamDesync { offset: u64, trailing: u64 },
}

/// A convenience `Result` type alias using the crate's `StarsError` type.
pub type Result<T> = std::result::Result<T, StarsError>;
