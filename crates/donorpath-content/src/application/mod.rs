//! Content application layer: loading and lookups.

pub mod loader;
pub mod store;
