//! Backward record chain stored inside each log block.
//!
//! Offset 0 of a log block holds the chain head: the offset of the newest
//! record's backlink field, or 0 when the block holds no records. Each record
//! is laid out as `[fields..][backlink]`, where the backlink is the offset of
//! the previous record's backlink in the same block (0 for the first record).
//! A record's fields therefore start right after the previous backlink, or
//! right after the header for the first record.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::page::read_int;
use crate::storage::{BLOCK_SIZE, INT_SIZE};
use std::fmt;

/// Offset of the chain head cell in every log block.
pub const CHAIN_HEAD_OFFSET: usize = 0;

/// Location of a record's backlink field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordAddress {
    pub block: u64,
    pub offset: usize,
}

impl fmt::Display for RecordAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.offset)
    }
}

/// Read the chain head of a log block.
pub fn chain_head(buf: &[u8]) -> StorageResult<usize> {
    let limit = BLOCK_SIZE.min(buf.len());
    checked_link(buf, CHAIN_HEAD_OFFSET, |link| link + INT_SIZE <= limit)
}

/// Follow the backlink stored at `offset` to the previous record's backlink.
///
/// A link always points strictly backwards, so walking a chain terminates
/// even on garbage input.
pub fn read_chain_link(buf: &[u8], offset: usize) -> StorageResult<usize> {
    checked_link(buf, offset, |link| link + INT_SIZE <= offset)
}

fn checked_link(
    buf: &[u8],
    offset: usize,
    in_range: impl Fn(usize) -> bool,
) -> StorageResult<usize> {
    let link = read_int(buf, offset)?;
    if link == 0 {
        return Ok(0);
    }
    let target = link as usize;
    if target < INT_SIZE || !in_range(target) {
        return Err(StorageError::CorruptChain { offset, link });
    }
    Ok(target)
}

/// Offset of the first field of a record whose backlink stores `prior`.
pub fn fields_start(prior: usize) -> usize {
    prior + INT_SIZE
}

/// Backlink offsets of every record in a block, newest first.
pub fn record_offsets(buf: &[u8]) -> StorageResult<Vec<usize>> {
    let mut offsets = Vec::new();
    let mut current = chain_head(buf)?;
    while current != 0 {
        offsets.push(current);
        current = read_chain_link(buf, current)?;
    }
    Ok(offsets)
}
