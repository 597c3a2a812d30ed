//! API Module
//!
//! Read-only DTO surfaces consumed by whatever transport fronts the
//! core (HTTP layer, CLI). No scoring logic lives here.

pub mod ranking;
pub mod status;

// Re-export common types
pub use ranking::{comuna_ranking, ComunaRanking};
pub use status::{service_status, ServiceStatus};
