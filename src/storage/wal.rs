//! Write-ahead log.
//!
//! Records are lists of ints and strings appended to a log file one block at
//! a time. Each block keeps its records on a backward chain so the log can be
//! read newest first, the order undo needs.

pub mod chain;
pub mod iterator;
pub mod manager;
pub mod record;

pub use chain::{read_chain_link, RecordAddress};
pub use iterator::RecordIterator;
pub use manager::LogManager;
pub use record::{LogRecord, Lsn, Value};
