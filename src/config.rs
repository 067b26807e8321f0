//! Engine configuration.

use std::path::PathBuf;

/// Where databases live and what their log file is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory under which each database gets its own subdirectory.
    pub root_dir: PathBuf,
    /// Name of the write-ahead log file inside a database directory.
    pub log_file: String,
}

impl StorageConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        StorageConfig {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_log_file(mut self, log_file: impl Into<String>) -> Self {
        self.log_file = log_file.into();
        self
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            root_dir: PathBuf::from("rql_data"),
            log_file: "rql.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = StorageConfig::new("/tmp/dbs").with_log_file("users.log");
        assert_eq!(config.root_dir, PathBuf::from("/tmp/dbs"));
        assert_eq!(config.log_file, "users.log");
        assert_eq!(StorageConfig::new("x").log_file, "rql.log");
    }
}
