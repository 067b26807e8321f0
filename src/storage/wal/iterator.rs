use crate::storage::error::StorageResult;
use crate::storage::wal::chain::{chain_head, fields_start, read_chain_link, RecordAddress};
use crate::storage::wal::record::LogRecord;
use crate::storage::{Block, FileManager, Page};
use log::debug;
use std::sync::Arc;

/// Walks a log newest record first, following each block's backward chain
/// and then stepping to the previous block.
pub struct RecordIterator {
    block: Block,
    page: Page,
    /// Backlink offset of the next record to yield in `block`, 0 when the
    /// block is exhausted.
    current: usize,
    done: bool,
}

impl RecordIterator {
    pub(crate) fn new(file_manager: Arc<FileManager>, block: Block) -> StorageResult<Self> {
        let mut page = Page::new(file_manager);
        page.read(&block)?;
        let current = chain_head(page.contents())?;

        Ok(Self {
            block,
            page,
            current,
            done: false,
        })
    }

    /// True while this block has records left or an earlier block exists.
    pub fn has_next(&self) -> bool {
        !self.done && (self.current > 0 || self.block.number() > 0)
    }

    /// Yield the next record, or `None` once the first block is exhausted.
    pub fn next_record(&mut self) -> StorageResult<Option<LogRecord>> {
        while self.current == 0 {
            let Some(previous) = self.block.previous() else {
                self.done = true;
                return Ok(None);
            };
            self.move_to(previous)?;
        }

        let backlink = self.current;
        let prior = read_chain_link(self.page.contents(), backlink)?;
        let data = self.page.contents()[fields_start(prior)..backlink].to_vec();
        let address = RecordAddress {
            block: self.block.number(),
            offset: backlink,
        };
        self.current = prior;

        Ok(Some(LogRecord::new(address, data)))
    }

    fn move_to(&mut self, block: Block) -> StorageResult<()> {
        debug!("Log iterator moving to {}", block);
        self.page.read(&block)?;
        self.current = chain_head(self.page.contents())?;
        self.block = block;
        Ok(())
    }
}

impl Iterator for RecordIterator {
    type Item = StorageResult<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
