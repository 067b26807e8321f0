//! Block-granular access to the files of one database directory.
//!
//! The `FileManager` is the only component that touches the operating
//! system's file interface. Every file is addressed in `BLOCK_SIZE` slots and
//! every write is synced to disk before the call returns.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::{Block, BLOCK_SIZE};
use dashmap::DashMap;
use log::{debug, info};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct FileManager {
    /// Directory holding every file of this database.
    directory: PathBuf,
    /// Whether `open` had to create `directory`.
    is_new: bool,
    /// Open handles, one per file name. The per-file mutex serializes all
    /// I/O against that file.
    open_files: DashMap<String, Arc<Mutex<File>>>,
}

impl FileManager {
    /// Open the database directory `directory_name` under `root_dir`,
    /// creating it (and any missing parents) if it does not exist yet.
    pub fn open(root_dir: &Path, directory_name: &str) -> StorageResult<Self> {
        let directory = root_dir.join(directory_name);
        let is_new = !directory.exists();

        if is_new {
            fs::create_dir_all(&directory).map_err(|e| {
                StorageError::io(format!("creating directory {}", directory.display()), e)
            })?;
            info!("Created database directory {}", directory.display());
        }

        Ok(Self {
            directory,
            is_new,
            open_files: DashMap::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Read `buf.len()` bytes starting at the first byte of `block`.
    ///
    /// A read that runs past the end of the file fails with an `Io` error of
    /// kind `UnexpectedEof`; the contents of `buf` are unspecified afterwards.
    pub fn read(&self, block: &Block, buf: &mut [u8]) -> StorageResult<()> {
        let file = self.file(block.file_name())?;
        let mut file = file.lock();

        file.seek(SeekFrom::Start(Self::block_offset(block.number())))
            .map_err(|e| StorageError::io(format!("seeking to {}", block), e))?;
        file.read_exact(buf)
            .map_err(|e| StorageError::io(format!("reading {}", block), e))?;

        Ok(())
    }

    /// Write `buf` at the first byte of `block` and sync it to disk.
    pub fn write(&self, block: &Block, buf: &[u8]) -> StorageResult<()> {
        let file = self.file(block.file_name())?;
        let mut file = file.lock();
        Self::write_at(&mut file, block, buf)
    }

    /// Write `buf` into a newly allocated block at the end of `file_name`.
    pub fn append(&self, file_name: &str, buf: &[u8]) -> StorageResult<Block> {
        let file = self.file(file_name)?;
        let mut file = file.lock();

        // Size and write happen under the same lock so concurrent appends
        // never hand out the same block.
        let number = Self::block_count(&file, file_name)?;
        let block = Block::new(file_name, number);
        Self::write_at(&mut file, &block, buf).map_err(|e| match e {
            StorageError::Io { context, source } => {
                StorageError::io(format!("appending: {}", context), source)
            }
            other => other,
        })?;

        debug!("Appended {}", block);
        Ok(block)
    }

    /// Number of whole blocks currently stored in `file_name`.
    pub fn size(&self, file_name: &str) -> StorageResult<u64> {
        let file = self.file(file_name)?;
        let file = file.lock();
        Self::block_count(&file, file_name)
    }

    /// Number of distinct files with a cached handle.
    pub fn open_file_count(&self) -> usize {
        self.open_files.len()
    }

    fn file(&self, file_name: &str) -> StorageResult<Arc<Mutex<File>>> {
        if let Some(file) = self.open_files.get(file_name) {
            return Ok(file.value().clone());
        }

        let entry = self
            .open_files
            .entry(file_name.to_string())
            .or_try_insert_with(|| {
                let path = self.directory.join(file_name);
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&path)
                    .map_err(|e| StorageError::io(format!("opening {}", path.display()), e))?;
                debug!("Opened {}", path.display());
                Ok::<_, StorageError>(Arc::new(Mutex::new(file)))
            })?;

        Ok(entry.value().clone())
    }

    fn write_at(file: &mut File, block: &Block, buf: &[u8]) -> StorageResult<()> {
        file.seek(SeekFrom::Start(Self::block_offset(block.number())))
            .map_err(|e| StorageError::io(format!("seeking to {}", block), e))?;
        file.write_all(buf)
            .map_err(|e| StorageError::io(format!("writing {}", block), e))?;
        file.sync_data()
            .map_err(|e| StorageError::io(format!("syncing {}", block), e))?;
        Ok(())
    }

    fn block_count(file: &File, file_name: &str) -> StorageResult<u64> {
        let len = file
            .metadata()
            .map_err(|e| StorageError::io(format!("stat of {}", file_name), e))?
            .len();
        Ok(len / BLOCK_SIZE as u64)
    }

    fn block_offset(number: u64) -> u64 {
        number * BLOCK_SIZE as u64
    }
}
