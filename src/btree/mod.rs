//! B-tree engine: owns the header, paged file, and node cache, and
//! implements create/open/close, insert, search, and in-order traversal.

mod engine;

pub use engine::Engine;
