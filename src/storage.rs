//! Storage layer implementation for rql.
//!
//! - **Block**: address of one fixed-size slot in a named file
//! - **FileManager**: block-granular, synchronously durable file I/O
//! - **Page**: one block's bytes with typed int/string accessors
//! - **LogManager**: append-only write-ahead log read back newest first

pub mod block;
pub mod error;
pub mod file_manager;
pub mod page;
pub mod wal;

pub use block::Block;
pub use error::{StorageError, StorageResult};
pub use file_manager::FileManager;
pub use page::Page;
pub use wal::{LogManager, LogRecord, Lsn, RecordIterator, Value};

/// Size of every block and page in bytes. Kept small so even modest logs
/// span many blocks. Changing it invalidates existing files.
pub const BLOCK_SIZE: usize = 400;

/// Bytes used to store an integer.
pub const INT_SIZE: usize = 4;
