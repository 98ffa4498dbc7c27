//! Node cache: a bounded, write-back mapping from block id to B-tree node.
//!
//! This is the sole path through which the engine's B-tree algorithms
//! touch node blocks. On a miss it loads through the paged file; on
//! eviction (and on `clear`) it writes the evicted node back. The engine
//! itself only ever writes the header block directly.

use crate::block::Node;
use crate::error::Result;
use crate::storage::PagedFile;
use crate::types::BlockId;
use std::collections::HashMap;

use super::lru::LruOrder;

/// A capacity-bounded, write-back node cache.
pub struct NodeCache {
    capacity: usize,
    entries: HashMap<BlockId, Node>,
    order: LruOrder,
}

impl NodeCache {
    /// Create a new cache holding at most `capacity` nodes at once.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "node cache capacity must be positive");
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: LruOrder::new(capacity),
        }
    }

    /// Fetch a node by block id, loading it from `file` on a cache miss.
    pub fn get(&mut self, id: BlockId, file: &mut PagedFile) -> Result<Node> {
        if let Some(node) = self.entries.get(&id) {
            let node = node.clone();
            self.order.touch(id.value());
            return Ok(node);
        }

        let buf = file.read_block(id)?;
        let node = Node::decode(&buf)?;
        self.put(id, node.clone(), file)?;
        Ok(node)
    }

    /// Insert or update a node in the cache, marking it most-recently-used.
    /// May evict the current least-recently-used entry (writing it to
    /// `file`) to make room.
    pub fn put(&mut self, id: BlockId, node: Node, file: &mut PagedFile) -> Result<()> {
        if !self.entries.contains_key(&id) && self.entries.len() >= self.capacity {
            self.evict_one(file)?;
        }
        self.entries.insert(id, node);
        self.order.touch(id.value());
        Ok(())
    }

    /// Write every cached node to `file`, in unspecified order, then drop
    /// all entries. Called at the start of `open` and during `close`.
    pub fn clear(&mut self, file: &mut PagedFile) -> Result<()> {
        let ids: Vec<BlockId> = self.order.ids().map(BlockId::new).collect();
        for id in ids {
            if let Some(node) = self.entries.get(&id) {
                file.write_block(id, &node.encode())?;
            }
            self.order.remove(id.value());
        }
        self.entries.clear();
        Ok(())
    }

    /// Number of nodes currently resident in the cache (test/diagnostic use).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn evict_one(&mut self, file: &mut PagedFile) -> Result<()> {
        let victim = self
            .order
            .least_recently_used()
            .map(BlockId::new)
            .expect("cache at capacity must have an entry to evict");

        if let Some(node) = self.entries.remove(&victim) {
            file.write_block(victim, &node.encode())?;
        }
        self.order.remove(victim.value());
        Ok(())
    }
}
