//! Domain model structs and DTOs.
//!
//! - `FromRow` + `Serialize` structs matching the query shapes
//! - `Deserialize` DTOs for create/edit submissions

pub mod plan;
