//! Client for the sibling catalog services (workouts, tags and apps).
//!
//! [`CatalogSource`] is the seam the plan service depends on;
//! [`CatalogClient`] is the HTTP implementation built on [`reqwest`].

pub mod client;
pub mod config;

pub use client::{CatalogClient, CatalogError, CatalogSource};
pub use config::CatalogConfig;
