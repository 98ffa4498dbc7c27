//! # indexfile
//!
//! A single-file, disk-resident B-tree index mapping unsigned 64-bit keys to
//! unsigned 64-bit values.
//!
//! ## Architecture
//!
//! The engine is composed of four layers, leaves first:
//!
//! - **Block Codec** (`block`): pure encode/decode of the header block and
//!   node blocks to/from fixed 512-byte buffers.
//! - **Paged File** (`storage`): typed, block-indexed I/O over an open file.
//! - **Node Cache** (`cache`): a bounded, write-back cache of node blocks.
//! - **B-Tree Engine** (`btree`): owns the header and cache, and implements
//!   create/open/close, insert, search, and in-order traversal.
//!
//! `io` adapts the engine's public API to the flat `<key>,<value>` text
//! format used for bulk load and extract.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use indexfile::{Engine, IndexConfig};
//!
//! let mut engine = Engine::create("index.db")?;
//! engine.insert(7, 100)?;
//! assert_eq!(engine.search(7)?, Some(100));
//! engine.close()?;
//! ```

pub mod block;
pub mod btree;
pub mod cache;
pub mod error;
pub mod io;
pub mod storage;
pub mod types;

pub use btree::Engine;
pub use error::{IndexError, Result};
pub use types::{BlockId, DEFAULT_CACHE_CAPACITY};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for opening or creating an index file.
///
/// Mirrors the builder shape of a conventional database `Config` type: a
/// required path plus optional tuning knobs, here limited to the node
/// cache's capacity.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Path to the index file.
    pub path: PathBuf,
    /// Node cache capacity (default 3).
    pub cache_capacity: usize,
}

impl IndexConfig {
    /// Create a new configuration with the default cache capacity.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Override the node cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

impl Engine {
    /// Create a new index file per `config`.
    pub fn create_with_config(config: &IndexConfig) -> Result<Self> {
        Engine::create_with_capacity(&config.path, config.cache_capacity)
    }

    /// Open an existing index file per `config`.
    pub fn open_with_config(config: &IndexConfig) -> Result<Self> {
        Engine::open_with_capacity(&config.path, config.cache_capacity)
    }
}

/// A node in a serializable snapshot of the tree's current shape, used for
/// debugging and the CLI's `print` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugNode {
    /// This node's block id.
    pub block_id: u64,
    /// Whether this node is a leaf.
    pub is_leaf: bool,
    /// Live keys, in order.
    pub keys: Vec<u64>,
    /// Values, co-indexed with `keys`.
    pub values: Vec<u64>,
    /// Child subtrees, left to right (empty for a leaf).
    pub children: Vec<DebugNode>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_roundtrips_through_engine() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.db");
        let config = IndexConfig::new(&path).cache_capacity(2);

        {
            let mut engine = Engine::create_with_config(&config)?;
            engine.insert(1, 10)?;
            engine.insert(2, 20)?;
            engine.close()?;
        }

        let mut engine = Engine::open_with_config(&config)?;
        assert_eq!(engine.search(1)?, Some(10));
        assert_eq!(engine.traverse()?, vec![(1, 10), (2, 20)]);
        Ok(())
    }

    #[test]
    fn basic_insert_search_traverse() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("basic.db");
        let mut engine = Engine::create(&path)?;

        engine.insert(5, 50)?;
        engine.insert(3, 30)?;
        engine.insert(8, 80)?;

        assert_eq!(engine.search(5)?, Some(50));
        assert_eq!(engine.search(99)?, None);
        assert_eq!(engine.traverse()?, vec![(3, 30), (5, 50), (8, 80)]);
        Ok(())
    }
}
