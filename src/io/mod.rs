//! Text I/O: a thin adapter between the flat `<key>,<value>` text format and
//! the engine's public `insert`/`traverse` calls. Owns no tree state.

mod text;

pub use text::{extract, load};
