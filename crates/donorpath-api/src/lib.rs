//! DonorPath — HTTP API.
//!
//! Exposes the content catalog, journey intents, impact estimation and
//! analytics ingestion over JSON.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
