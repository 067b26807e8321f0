//! Storage layer error types.

use std::io;
use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Page is full: offset {offset} requires {required} bytes but only {available} available")]
    PageFull {
        offset: usize,
        required: usize,
        available: usize,
    },

    #[error("Read out of bounds: {len} bytes at offset {offset}")]
    OutOfBounds { offset: usize, len: usize },

    #[error("String at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("Corrupt log chain: link {link} stored at offset {offset}")]
    CorruptChain { offset: usize, link: u32 },

    #[error("Log record of {size} bytes can never fit in a block (max {max})")]
    RecordTooLarge { size: usize, max: usize },

    #[error("Log record overrun: requested {requested} bytes but only {remaining} remain")]
    RecordOverrun { requested: usize, remaining: usize },
}

impl StorageError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        StorageError::Io {
            context: context.into(),
            source,
        }
    }

    /// True if this is a read that ran past the end of a file.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, StorageError::Io { source, .. } if source.kind() == io::ErrorKind::UnexpectedEof)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
