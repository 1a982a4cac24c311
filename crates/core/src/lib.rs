//! `claimgate-core` — shared building blocks for the claimgate crates.
//!
//! This crate contains **pure** primitives (no HTTP, no storage, no clocks).

pub mod error;

pub use error::{DomainError, DomainResult};
