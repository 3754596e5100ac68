//! Composition of repository reads with catalog enrichment.

pub mod dispatch;
pub mod enrich;
pub mod plan_service;

pub use plan_service::PlanService;
