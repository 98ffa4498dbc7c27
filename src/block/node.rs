//! B-tree node block encoding.
//!
//! Layout (512 bytes total, for block k >= 1):
//! ```text
//! Offset  Size     Description
//! 0       8        block_id (self-address)
//! 8       8        parent_id (0 for root)
//! 16      8        key_count, n
//! 24      19 * 8   keys[0..19]; only the first n are live
//! 176     19 * 8   values[0..19], co-indexed with keys
//! 328     20 * 8   children[0..20]; 0 means "no child"
//! 488     24       zero-filled padding
//! ```

use crate::error::{IndexError, Result};
use crate::types::{BlockId, BLOCK_SIZE, MAX_CHILDREN, MAX_KEYS};

const KEYS_OFFSET: usize = 24;
const VALUES_OFFSET: usize = KEYS_OFFSET + MAX_KEYS * 8;
const CHILDREN_OFFSET: usize = VALUES_OFFSET + MAX_KEYS * 8;
const NODE_BYTES: usize = CHILDREN_OFFSET + MAX_CHILDREN * 8;

/// An in-memory B-tree node, decoded from (or destined for) one file block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// This node's own block id.
    pub block_id: BlockId,
    /// The structural parent's block id; `BlockId::NONE` for the root.
    pub parent_id: BlockId,
    /// Number of live keys, n (0 <= n <= MAX_KEYS).
    pub key_count: usize,
    /// Keys, strictly increasing among indices `0..key_count`.
    pub keys: [u64; MAX_KEYS],
    /// Values, co-indexed with `keys`.
    pub values: [u64; MAX_KEYS],
    /// Child block ids; `BlockId::NONE` means "no child". A leaf has all
    /// slots empty; an internal node has exactly `key_count + 1` non-empty
    /// slots occupying indices `0..=key_count`.
    pub children: [BlockId; MAX_CHILDREN],
}

impl Node {
    /// Create a new, empty node with the given self and parent block ids.
    pub fn new(block_id: BlockId, parent_id: BlockId) -> Self {
        Self {
            block_id,
            parent_id,
            key_count: 0,
            keys: [0; MAX_KEYS],
            values: [0; MAX_KEYS],
            children: [BlockId::NONE; MAX_CHILDREN],
        }
    }

    /// A node is a leaf iff every child slot is empty.
    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| !c.is_some())
    }

    /// Whether this node is full and must be split before another key is
    /// inserted into it.
    pub fn is_full(&self) -> bool {
        self.key_count == MAX_KEYS
    }

    /// Encode this node into a fresh `BLOCK_SIZE`-byte buffer.
    pub fn encode(&self) -> [u8; BLOCK_SIZE] {
        let mut buf = [0u8; BLOCK_SIZE];
        buf[0..8].copy_from_slice(&self.block_id.value().to_be_bytes());
        buf[8..16].copy_from_slice(&self.parent_id.value().to_be_bytes());
        buf[16..24].copy_from_slice(&(self.key_count as u64).to_be_bytes());

        for i in 0..MAX_KEYS {
            let key = if i < self.key_count { self.keys[i] } else { 0 };
            let value = if i < self.key_count { self.values[i] } else { 0 };
            buf[KEYS_OFFSET + i * 8..KEYS_OFFSET + (i + 1) * 8].copy_from_slice(&key.to_be_bytes());
            buf[VALUES_OFFSET + i * 8..VALUES_OFFSET + (i + 1) * 8]
                .copy_from_slice(&value.to_be_bytes());
        }

        for i in 0..MAX_CHILDREN {
            buf[CHILDREN_OFFSET + i * 8..CHILDREN_OFFSET + (i + 1) * 8]
                .copy_from_slice(&self.children[i].value().to_be_bytes());
        }

        buf
    }

    /// Decode a node from a byte buffer.
    ///
    /// Does not validate semantic invariants (strictly increasing keys,
    /// child-count agreement with `key_count`, etc.) beyond checking that
    /// `buf` is long enough to contain a full block.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < NODE_BYTES {
            return Err(IndexError::ShortBlock {
                expected: NODE_BYTES,
                actual: buf.len(),
            });
        }

        let block_id = BlockId::new(u64::from_be_bytes(buf[0..8].try_into().unwrap()));
        let parent_id = BlockId::new(u64::from_be_bytes(buf[8..16].try_into().unwrap()));
        let key_count = u64::from_be_bytes(buf[16..24].try_into().unwrap()) as usize;

        let mut keys = [0u64; MAX_KEYS];
        let mut values = [0u64; MAX_KEYS];
        for i in 0..MAX_KEYS {
            keys[i] = u64::from_be_bytes(
                buf[KEYS_OFFSET + i * 8..KEYS_OFFSET + (i + 1) * 8]
                    .try_into()
                    .unwrap(),
            );
            values[i] = u64::from_be_bytes(
                buf[VALUES_OFFSET + i * 8..VALUES_OFFSET + (i + 1) * 8]
                    .try_into()
                    .unwrap(),
            );
        }

        let mut children = [BlockId::NONE; MAX_CHILDREN];
        for i in 0..MAX_CHILDREN {
            children[i] = BlockId::new(u64::from_be_bytes(
                buf[CHILDREN_OFFSET + i * 8..CHILDREN_OFFSET + (i + 1) * 8]
                    .try_into()
                    .unwrap(),
            ));
        }

        Ok(Self {
            block_id,
            parent_id,
            key_count,
            keys,
            values,
            children,
        })
    }
}
