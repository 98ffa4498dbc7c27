//! Node cache: bounded, write-back in-memory cache of B-tree node blocks.

mod lru;
mod node_cache;

pub use node_cache::NodeCache;
