//! Conversion errors
//!
//! Every variant aborts the conversion request that raised it. Nothing in the
//! core touches the network or the filesystem, so there is no transient class.

use thiserror::Error;

/// Errors raised by segmentation, document construction and assembly
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Empty caption sequence, zero group size, or a window outside its captions
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed `z`/`xy`/attribute fields, or an unparseable project document
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// The two caption streams diverge too much to align chunk `chunk`
    #[error(
        "Alignment invariant violated in chunk {chunk}: end index {end_index} precedes start index {start_index}"
    )]
    AlignmentInvariantViolation {
        chunk: usize,
        start_index: usize,
        end_index: usize,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
