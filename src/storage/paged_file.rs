//! Paged file: typed, block-indexed I/O over an open file handle.
//!
//! The paged file knows nothing about headers or node semantics — it
//! only reads and writes whole `BLOCK_SIZE`-byte blocks at block-indexed
//! offsets. The node cache and the engine are the only callers.

use crate::error::{IndexError, Result};
use crate::types::{BlockId, BLOCK_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// How a paged file should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create a new file, failing if one already exists at the path.
    CreateNew,
    /// Open an existing file for reading and writing.
    ReadWrite,
}

/// A block-addressed file. Every read or write operates on exactly one
/// `BLOCK_SIZE`-byte block.
pub struct PagedFile {
    file: Option<File>,
}

impl PagedFile {
    /// Open a file at `path` in the given mode.
    pub fn open(path: &Path, mode: OpenMode) -> Result<Self> {
        let file = match mode {
            OpenMode::CreateNew => OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(path)?,
            OpenMode::ReadWrite => {
                if !path.exists() {
                    return Err(IndexError::NotFound(path.display().to_string()));
                }
                OpenOptions::new().read(true).write(true).open(path)?
            }
        };
        Ok(Self { file: Some(file) })
    }

    /// Read block `index` into a fresh `BLOCK_SIZE`-byte buffer.
    pub fn read_block(&mut self, index: BlockId) -> Result<[u8; BLOCK_SIZE]> {
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(index.file_offset(BLOCK_SIZE)))?;

        let mut buf = [0u8; BLOCK_SIZE];
        let mut total = 0;
        loop {
            let n = file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
            if total == BLOCK_SIZE {
                break;
            }
        }
        if total < BLOCK_SIZE {
            return Err(IndexError::ShortBlock {
                expected: BLOCK_SIZE,
                actual: total,
            });
        }
        Ok(buf)
    }

    /// Write exactly `BLOCK_SIZE` bytes to block `index`, then flush.
    pub fn write_block(&mut self, index: BlockId, buf: &[u8; BLOCK_SIZE]) -> Result<()> {
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(index.file_offset(BLOCK_SIZE)))?;
        file.write_all(buf)?;
        file.flush()?;
        Ok(())
    }

    /// Close the file. Idempotent — calling this (or dropping the
    /// `PagedFile`) more than once is harmless.
    pub fn close(&mut self) {
        self.file = None;
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file
            .as_mut()
            .ok_or(IndexError::NotOpen)
    }
}
