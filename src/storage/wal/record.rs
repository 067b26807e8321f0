//! Log record values and the cursor used to decode them.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::page::read_int;
use crate::storage::wal::chain::RecordAddress;
use crate::storage::INT_SIZE;
use std::fmt;

/// A single field of a log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(u32),
    Text(String),
}

impl Value {
    /// Number of bytes this value occupies once written to a page.
    pub fn encoded_size(&self) -> usize {
        match self {
            Value::Int(_) => INT_SIZE,
            Value::Text(s) => s.len() + INT_SIZE,
        }
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Log Sequence Number.
///
/// The LSN is the index of the log block a record was written to, so every
/// record in the same block shares one LSN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Lsn(pub u64);

impl fmt::Display for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LSN({})", self.0)
    }
}

/// The fields of one log record, read back in the order they were appended.
///
/// Records carry no schema: callers must ask for ints and strings in the
/// same order they wrote them. Asking for the wrong type decodes garbage;
/// reading past the last field fails with `RecordOverrun`.
#[derive(Debug, Clone)]
pub struct LogRecord {
    address: RecordAddress,
    data: Vec<u8>,
    pos: usize,
}

impl LogRecord {
    pub(crate) fn new(address: RecordAddress, data: Vec<u8>) -> Self {
        Self {
            address,
            data,
            pos: 0,
        }
    }

    /// Block and backlink offset this record was read from.
    pub fn address(&self) -> RecordAddress {
        self.address
    }

    /// Raw bytes of every field.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn next_int(&mut self) -> StorageResult<u32> {
        self.ensure_remaining(INT_SIZE)?;
        let value = read_int(&self.data, self.pos)?;
        self.pos += INT_SIZE;
        Ok(value)
    }

    pub fn next_bytes(&mut self) -> StorageResult<Vec<u8>> {
        let bytes = self.peek_bytes()?.to_vec();
        self.pos += bytes.len() + INT_SIZE;
        Ok(bytes)
    }

    pub fn next_string(&mut self) -> StorageResult<String> {
        let offset = self.pos;
        let text = std::str::from_utf8(self.peek_bytes()?)
            .map_err(|_| StorageError::InvalidUtf8 { offset })?
            .to_string();
        self.pos += text.len() + INT_SIZE;
        Ok(text)
    }

    fn peek_bytes(&self) -> StorageResult<&[u8]> {
        self.ensure_remaining(INT_SIZE)?;
        let len = read_int(&self.data, self.pos)? as usize;
        self.ensure_remaining(INT_SIZE + len)?;
        let start = self.pos + INT_SIZE;
        Ok(&self.data[start..start + len])
    }

    fn ensure_remaining(&self, requested: usize) -> StorageResult<()> {
        let remaining = self.remaining();
        if requested > remaining {
            return Err(StorageError::RecordOverrun {
                requested,
                remaining,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(data: Vec<u8>) -> LogRecord {
        LogRecord::new(RecordAddress { block: 0, offset: 4 }, data)
    }

    #[test]
    fn test_encoded_size() {
        assert_eq!(Value::Int(2000).encoded_size(), 4);
        assert_eq!(Value::from("hello").encoded_size(), 9);
        assert_eq!(Value::from("").encoded_size(), 4);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(3_000_000_000).to_string(), "3000000000");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Lsn(7).to_string(), "LSN(7)");
    }

    #[test]
    fn test_decode_fields_in_order() -> StorageResult<()> {
        let mut data = Vec::new();
        data.extend_from_slice(&42u32.to_le_bytes());
        data.extend_from_slice(&7u32.to_le_bytes());
        data.extend_from_slice(b"meaning");
        data.extend_from_slice(&u32::MAX.to_le_bytes());

        let mut rec = record(data);
        assert_eq!(rec.len(), 19);
        assert_eq!(rec.next_int()?, 42);
        assert_eq!(rec.next_string()?, "meaning");
        assert_eq!(rec.next_int()?, u32::MAX);
        assert_eq!(rec.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_overrun_is_reported() {
        let mut rec = record(1u32.to_le_bytes().to_vec());
        assert!(rec.next_int().is_ok());
        assert!(matches!(
            rec.next_int(),
            Err(StorageError::RecordOverrun {
                requested: 4,
                remaining: 0
            })
        ));
    }

    #[test]
    fn test_string_length_past_end_is_reported() {
        let mut data = 50u32.to_le_bytes().to_vec();
        data.extend_from_slice(b"short");

        let mut rec = record(data);
        assert!(matches!(
            rec.next_string(),
            Err(StorageError::RecordOverrun { requested: 54, .. })
        ));
        // The cursor does not move on failure.
        assert_eq!(rec.remaining(), 9);
    }

    #[test]
    fn test_invalid_utf8_keeps_raw_bytes() -> StorageResult<()> {
        let mut data = 2u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);

        let mut rec = record(data);
        assert!(matches!(
            rec.next_string(),
            Err(StorageError::InvalidUtf8 { offset: 0 })
        ));
        assert_eq!(rec.next_bytes()?, vec![0xffu8, 0xfe]);
        Ok(())
    }
}
