//! Storage layer: block-indexed disk I/O.

mod paged_file;

pub use paged_file::{OpenMode, PagedFile};
