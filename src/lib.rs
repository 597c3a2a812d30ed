//! Riesgo-Core - Traffic Incident Risk Scoring (Library Root)
//!
//! Harmonizes raw incident records into the canonical training vocabulary and
//! scores them with the blended classifier pair loaded from exported artifacts.

pub mod api;
pub mod constants;
pub mod error;
pub mod logic;

pub use error::{ArtifactError, ScoringError};
pub use logic::artifacts::{ArtifactBundle, ArtifactStore, StoreStatus};
pub use logic::harmonize::{harmonize, CanonicalRecord, RawRecord};
pub use logic::pipeline::types::{BatchInput, PredictionResult, RiskLevel};
pub use logic::pipeline::Pipeline;
