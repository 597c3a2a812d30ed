//! Logic Module - Scoring Engines
//!
//! The scoring path, leaves first:
//! - `harmonize` - raw fields onto the trained vocabulary
//! - `features/` - schema-driven matrix building and alignment
//! - `model/` - pure-Rust ensemble inference
//! - `artifacts/` - snapshot loading and publishing
//! - `pipeline/` - orchestration and risk levels
//! - `telemetry` - degradation counters

pub mod artifacts;
pub mod features;
pub mod harmonize;
pub mod model;
pub mod pipeline;
pub mod telemetry;
