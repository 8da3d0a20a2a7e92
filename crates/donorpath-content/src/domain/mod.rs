//! Content domain: catalog models and their invariants.

pub mod models;
pub mod validation;
