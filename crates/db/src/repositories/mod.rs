//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod plan_repo;
pub mod version_repo;

pub use plan_repo::PlanRepo;
pub use version_repo::VersionRepo;
