use crate::config::StorageConfig;
use crate::storage::{FileManager, LogManager, LogRecord, Lsn, Page, StorageResult, Value};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// One opened database directory together with its write-ahead log.
///
/// This is the surface the layers above storage build on: open a database
/// by name, get at its files through pages, and append to or read back its
/// log.
pub struct Database {
    name: String,
    file_manager: Arc<FileManager>,
    log: Mutex<LogManager>,
}

impl Database {
    /// Open the database `name` under `config.root_dir`, creating it if it
    /// does not exist yet.
    pub fn open(config: &StorageConfig, name: &str) -> StorageResult<Self> {
        let file_manager = Arc::new(FileManager::open(&config.root_dir, name)?);
        let log = LogManager::new(file_manager.clone(), &config.log_file)?;

        info!(
            "{} database {} at {}",
            if file_manager.is_new() { "Created" } else { "Opened" },
            name,
            file_manager.directory().display()
        );

        Ok(Self {
            name: name.to_string(),
            file_manager,
            log: Mutex::new(log),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether opening this database created its directory.
    pub fn is_new(&self) -> bool {
        self.file_manager.is_new()
    }

    pub fn file_manager(&self) -> &Arc<FileManager> {
        &self.file_manager
    }

    /// A fresh zeroed page bound to this database's files.
    pub fn new_page(&self) -> Page {
        Page::new(self.file_manager.clone())
    }

    pub fn append(&self, values: &[Value]) -> StorageResult<Lsn> {
        self.log.lock().append(values)
    }

    pub fn flush(&self) -> StorageResult<()> {
        self.log.lock().flush()
    }

    pub fn flush_lsn(&self, lsn: Lsn) -> StorageResult<()> {
        self.log.lock().flush_lsn(lsn)
    }

    /// Every log record, newest first.
    pub fn records(&self) -> StorageResult<Vec<LogRecord>> {
        self.log.lock().iterator()?.collect()
    }

    /// Run `f` with exclusive access to the log manager.
    pub fn with_log<T>(&self, f: impl FnOnce(&mut LogManager) -> T) -> T {
        f(&mut *self.log.lock())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Best effort flush on drop
        if let Err(e) = self.log.get_mut().flush() {
            warn!("Failed to flush log of database {} on drop: {}", self.name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_database() -> Result<()> {
        let root = tempdir()?;
        let config = StorageConfig::new(root.path());

        let db = Database::open(&config, "example")?;
        assert!(db.is_new());
        assert_eq!(db.name(), "example");
        assert!(root.path().join("example").join("rql.log").exists());
        drop(db);

        let db = Database::open(&config, "example")?;
        assert!(!db.is_new());

        Ok(())
    }

    #[test]
    fn test_append_and_read_back() -> Result<()> {
        let root = tempdir()?;
        let db = Database::open(&StorageConfig::new(root.path()), "example")?;

        let lsn = db.append(&[Value::from("create"), Value::from("users")])?;
        db.append(&[Value::Int(3)])?;
        db.flush_lsn(lsn)?;

        let mut records = db.records()?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].next_int()?, 3);
        assert_eq!(records[1].next_string()?, "create");
        assert_eq!(records[1].next_string()?, "users");

        Ok(())
    }

    #[test]
    fn test_drop_flushes_log() -> Result<()> {
        let root = tempdir()?;
        let config = StorageConfig::new(root.path()).with_log_file("example.log");

        {
            let db = Database::open(&config, "example")?;
            db.append(&[Value::from("pending")])?;
        }

        let db = Database::open(&config, "example")?;
        let mut records = db.records()?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].next_string()?, "pending");

        Ok(())
    }

    #[test]
    fn test_with_log_exposes_manager() -> Result<()> {
        let root = tempdir()?;
        let db = Database::open(&StorageConfig::new(root.path()), "example")?;

        let lsn = db.with_log(|log| log.current_lsn());
        assert_eq!(lsn, Lsn(0));
        assert_eq!(db.with_log(|log| log.file_name().to_string()), "rql.log");

        Ok(())
    }
}
