//! Error types for the index engine.

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while creating, opening, or operating on an index file.
#[derive(Error, Debug)]
pub enum IndexError {
    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening an index file that does not exist.
    #[error("index file not found: {0}")]
    NotFound(String),

    /// The first 8 bytes of block 0 did not match the expected magic literal.
    #[error("bad magic number: expected `4337PRJ3`")]
    BadMagic,

    /// A block read or decode returned fewer than `BLOCK_SIZE` bytes.
    #[error("short block: expected {expected} bytes, got {actual}")]
    ShortBlock { expected: usize, actual: usize },

    /// A mutation or query was attempted before a successful `create`/`open`.
    #[error("index is not open")]
    NotOpen,

    /// Malformed input at a text or API boundary: a non-numeric text field,
    /// or a key that already exists in the index.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl IndexError {
    /// Build an `InvalidInput` error from anything that converts to a `String`.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
