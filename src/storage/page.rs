//! Fixed-size in-memory pages with typed accessors.
//!
//! Integers are stored as 4 little-endian bytes. Strings are stored as a
//! 4-byte little-endian byte length followed by the raw bytes.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::{Block, FileManager, BLOCK_SIZE, INT_SIZE};
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use std::sync::Arc;

/// One block's worth of bytes, bound to the `FileManager` it is read from
/// and written to.
pub struct Page {
    contents: Box<[u8; BLOCK_SIZE]>,
    file_manager: Arc<FileManager>,
}

impl Page {
    pub fn new(file_manager: Arc<FileManager>) -> Self {
        Self {
            contents: Box::new([0u8; BLOCK_SIZE]),
            file_manager,
        }
    }

    pub fn get_int(&self, offset: usize) -> StorageResult<u32> {
        read_int(self.contents.as_slice(), offset)
    }

    pub fn set_int(&mut self, offset: usize, value: u32) -> StorageResult<()> {
        self.ensure_room(offset, INT_SIZE)?;
        LittleEndian::write_u32(&mut self.contents[offset..offset + INT_SIZE], value);
        Ok(())
    }

    pub fn get_bytes(&self, offset: usize) -> StorageResult<&[u8]> {
        read_bytes(self.contents.as_slice(), offset)
    }

    pub fn set_bytes(&mut self, offset: usize, value: &[u8]) -> StorageResult<()> {
        self.ensure_room(offset, INT_SIZE + value.len())?;
        let start = offset + INT_SIZE;
        LittleEndian::write_u32(&mut self.contents[offset..start], value.len() as u32);
        self.contents[start..start + value.len()].copy_from_slice(value);
        Ok(())
    }

    pub fn get_string(&self, offset: usize) -> StorageResult<String> {
        read_string(self.contents.as_slice(), offset)
    }

    pub fn set_string(&mut self, offset: usize, value: &str) -> StorageResult<()> {
        self.set_bytes(offset, value.as_bytes())
    }

    /// Replace the contents of this page with `block`.
    ///
    /// Blocks that were never written (or lie past the end of the file) read
    /// back as all zeroes. A trailing block that is only partly present on
    /// disk also reads as all zeroes; the bytes that were there are dropped.
    /// Blocks are always written whole, so this only happens after a torn
    /// write.
    pub fn read(&mut self, block: &Block) -> StorageResult<()> {
        self.clear();
        match self.file_manager.read(block, self.contents.as_mut_slice()) {
            Err(e) if e.is_unexpected_eof() => {
                debug!("{} is past the end of its file, reading as empty", block);
                self.clear();
                Ok(())
            }
            result => result,
        }
    }

    /// Persist the contents of this page to `block`.
    pub fn write(&self, block: &Block) -> StorageResult<()> {
        self.file_manager.write(block, self.contents.as_slice())
    }

    /// Persist the contents of this page to a new block at the end of
    /// `file_name`.
    pub fn append(&self, file_name: &str) -> StorageResult<Block> {
        self.file_manager.append(file_name, self.contents.as_slice())
    }

    /// Zero the whole buffer.
    pub fn clear(&mut self) {
        self.contents.fill(0);
    }

    pub fn contents(&self) -> &[u8] {
        self.contents.as_slice()
    }

    pub fn file_manager(&self) -> &Arc<FileManager> {
        &self.file_manager
    }

    fn ensure_room(&self, offset: usize, required: usize) -> StorageResult<()> {
        let available = BLOCK_SIZE.saturating_sub(offset);
        if available < required {
            return Err(StorageError::PageFull {
                offset,
                required,
                available,
            });
        }
        Ok(())
    }
}

pub(crate) fn read_int(buf: &[u8], offset: usize) -> StorageResult<u32> {
    let bytes = slice_at(buf, offset, INT_SIZE)?;
    Ok(LittleEndian::read_u32(bytes))
}

pub(crate) fn read_bytes(buf: &[u8], offset: usize) -> StorageResult<&[u8]> {
    let len = read_int(buf, offset)? as usize;
    slice_at(buf, offset + INT_SIZE, len)
}

pub(crate) fn read_string(buf: &[u8], offset: usize) -> StorageResult<String> {
    let bytes = read_bytes(buf, offset)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| StorageError::InvalidUtf8 { offset })
}

fn slice_at(buf: &[u8], offset: usize, len: usize) -> StorageResult<&[u8]> {
    offset
        .checked_add(len)
        .filter(|&end| end <= buf.len())
        .map(|end| &buf[offset..end])
        .ok_or(StorageError::OutOfBounds { offset, len })
}
