//! Append-only, block-chunked write-ahead log.
//!
//! The log manager buffers records for the newest log block in a single
//! `Page`. Records never span blocks: when the next record does not fit, the
//! buffered page is flushed and a fresh block is appended to the log file.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::wal::chain::{chain_head, CHAIN_HEAD_OFFSET};
use crate::storage::wal::iterator::RecordIterator;
use crate::storage::wal::record::{Lsn, Value};
use crate::storage::{Block, FileManager, Page, BLOCK_SIZE, INT_SIZE};
use log::{debug, info};
use std::sync::Arc;

pub struct LogManager {
    file_manager: Arc<FileManager>,
    /// Name of the log file inside the database directory.
    file_name: String,
    /// Buffer for `current_block`.
    page: Page,
    /// Block currently being appended to.
    current_block: Block,
    /// Next free byte in `page`.
    current_position: usize,
}

impl LogManager {
    /// Attach to the log file `file_name`, creating its first block if the
    /// file is empty. An existing log resumes right after its last record.
    pub fn new(file_manager: Arc<FileManager>, file_name: &str) -> StorageResult<Self> {
        let size = file_manager.size(file_name)?;
        let mut page = Page::new(file_manager.clone());

        let (current_block, current_position) = if size == 0 {
            (Self::append_new_block(&file_manager, &mut page, file_name)?, INT_SIZE)
        } else {
            let block = Block::new(file_name, size - 1);
            page.read(&block)?;
            let last_record = chain_head(page.contents())?;
            info!(
                "Resuming log {} at {} after record at offset {}",
                file_name, block, last_record
            );
            (block, last_record + INT_SIZE)
        };

        Ok(Self {
            file_manager,
            file_name: file_name.to_string(),
            page,
            current_block,
            current_position,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// LSN of the block records are currently appended to.
    pub fn current_lsn(&self) -> Lsn {
        Lsn(self.current_block.number())
    }

    /// Append one record made of `values` and return its LSN.
    pub fn append(&mut self, values: &[Value]) -> StorageResult<Lsn> {
        let record_size = INT_SIZE + values.iter().map(Value::encoded_size).sum::<usize>();
        let max = BLOCK_SIZE - INT_SIZE - 1;
        if record_size > max {
            return Err(StorageError::RecordTooLarge {
                size: record_size,
                max,
            });
        }

        if self.current_position + record_size >= BLOCK_SIZE {
            self.flush()?;
            self.current_block =
                Self::append_new_block(&self.file_manager, &mut self.page, &self.file_name)?;
            self.current_position = INT_SIZE;
        }

        for value in values {
            self.append_value(value)?;
        }
        self.finalize_record()?;

        Ok(self.current_lsn())
    }

    /// Write the buffered page to its block.
    pub fn flush(&mut self) -> StorageResult<()> {
        debug!("Flushing log {}", self.current_block);
        self.page.write(&self.current_block)
    }

    /// Make every record up to and including `lsn` durable.
    ///
    /// Blocks before the current one were written when they filled up, so
    /// only a request for the current block (or later) needs I/O.
    pub fn flush_lsn(&mut self, lsn: Lsn) -> StorageResult<()> {
        if lsn >= self.current_lsn() {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush any buffered records and iterate over the whole log, newest
    /// record first.
    pub fn iterator(&mut self) -> StorageResult<RecordIterator> {
        self.flush()?;
        RecordIterator::new(self.file_manager.clone(), self.current_block.clone())
    }

    /// Allocate an empty log block and retarget `page` at it.
    ///
    /// The block is written from a scratch buffer, so `page` still holds the
    /// previous block if the append fails.
    fn append_new_block(
        file_manager: &FileManager,
        page: &mut Page,
        file_name: &str,
    ) -> StorageResult<Block> {
        // A zeroed block has a chain head of 0.
        let block = file_manager.append(file_name, &[0u8; BLOCK_SIZE])?;
        page.clear();
        debug!("Started log block {}", block);
        Ok(block)
    }

    fn append_value(&mut self, value: &Value) -> StorageResult<()> {
        match value {
            Value::Int(v) => self.page.set_int(self.current_position, *v)?,
            Value::Text(s) => self.page.set_string(self.current_position, s)?,
        }
        self.current_position += value.encoded_size();
        Ok(())
    }

    /// Link the record just written into the block's chain.
    fn finalize_record(&mut self) -> StorageResult<()> {
        let prior_head = self.page.get_int(CHAIN_HEAD_OFFSET)?;
        self.page.set_int(self.current_position, prior_head)?;
        self.page.set_int(CHAIN_HEAD_OFFSET, self.current_position as u32)?;
        self.current_position += INT_SIZE;
        Ok(())
    }
}
