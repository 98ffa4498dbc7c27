//! Index file header (block 0).
//!
//! Layout (512 bytes total):
//! ```text
//! Offset  Size  Description
//! 0       8     Magic literal "4337PRJ3"
//! 8       8     root_id, big-endian (0 = empty tree)
//! 16      8     next_block_id, big-endian (smallest unused block id)
//! 24      488   zero-filled padding
//! ```

use crate::error::{IndexError, Result};
use crate::types::{BlockId, BLOCK_SIZE, MAGIC};

/// Decoded contents of the header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Block id of the root node; `BlockId::NONE` means the tree is empty.
    pub root_id: BlockId,
    /// Smallest unused block id. Monotonically increasing within a session.
    pub next_block_id: BlockId,
}

impl Header {
    /// The header for a freshly created, empty index.
    pub fn empty() -> Self {
        Self {
            root_id: BlockId::NONE,
            next_block_id: BlockId::new(1),
        }
    }

    /// Encode this header into a fresh `BLOCK_SIZE`-byte buffer.
    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let mut buf = [0u8; BLOCK_SIZE];
        buf[0..8].copy_from_slice(MAGIC);
        buf[8..16].copy_from_slice(&self.root_id.value().to_be_bytes());
        buf[16..24].copy_from_slice(&self.next_block_id.value().to_be_bytes());
        buf
    }

    /// Decode a header from a byte buffer.
    ///
    /// Fails with `BadMagic` if the first 8 bytes don't match the expected
    /// literal, or `ShortBlock` if `buf` is shorter than `BLOCK_SIZE`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < BLOCK_SIZE {
            return Err(IndexError::ShortBlock {
                expected: BLOCK_SIZE,
                actual: buf.len(),
            });
        }
        if &buf[0..8] != MAGIC {
            return Err(IndexError::BadMagic);
        }
        let root_id = BlockId::new(u64::from_be_bytes(buf[8..16].try_into().unwrap()));
        let next_block_id = BlockId::new(u64::from_be_bytes(buf[16..24].try_into().unwrap()));
        Ok(Self {
            root_id,
            next_block_id,
        })
    }
}
