use std::fmt;

/// Address of one `BLOCK_SIZE` slot inside a named file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    file_name: String,
    number: u64,
}

impl Block {
    pub fn new(file_name: impl Into<String>, number: u64) -> Self {
        Self {
            file_name: file_name.into(),
            number,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    /// The block right before this one in the same file, if any.
    pub fn previous(&self) -> Option<Block> {
        self.number
            .checked_sub(1)
            .map(|number| Block::new(self.file_name.clone(), number))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[file {}, block {}]", self.file_name, self.number)
    }
}
