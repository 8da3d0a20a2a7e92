//! DonorPath Core — shared domain abstractions.
//!
//! This crate defines the traits and types every DonorPath context depends
//! on: event-sourced aggregates, commands, time and randomness seams, the
//! event repository contract, and the domain error taxonomy. It contains no
//! infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod engagement;
pub mod error;
pub mod event;
pub mod repository;
pub mod rng;
