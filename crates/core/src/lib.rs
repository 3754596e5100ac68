//! Domain types and pure helpers shared by the workout plan service crates.
//!
//! This crate performs no I/O so it can be used by the repository layer,
//! the catalog client and the HTTP layer alike.

pub mod error;
pub mod plan;
pub mod types;
