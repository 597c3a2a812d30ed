//! Pipeline Result Types
//!
//! Risk buckets and the per-record result DTO. Wire labels stay in
//! Spanish because that is what the trained service always reported;
//! only the Rust identifiers are English.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
use crate::logic::harmonize::RawRecord;

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Discrete risk bucket derived from the blended score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "BAJO")]
    Low,
    #[serde(rename = "MEDIO")]
    Medium,
    #[serde(rename = "ALTO")]
    High,
}

impl RiskLevel {
    /// Fixed threshold policy. Both cuts are strictly-greater, so 0.50
    /// is medium and 0.25 is low.
    pub fn from_score(score: f64) -> Self {
        if score > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if score > MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "BAJO",
            RiskLevel::Medium => "MEDIO",
            RiskLevel::High => "ALTO",
        }
    }

    /// Numeric severity for ordering (0 = low, 2 = high)
    pub fn severity_level(&self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Scored outcome for one record. Created per record, never mutated,
/// not persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Blended positive-class probability, in [0, 1]
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// Echoed attributes for display, not a feature-importance ranking
    pub drivers: Vec<String>,
    /// The record as submitted, before harmonization
    pub input_data: RawRecord,
    pub timestamp: DateTime<Utc>,
}

impl PredictionResult {
    pub(crate) fn new(score: f64, raw: &RawRecord) -> Self {
        Self {
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            drivers: build_drivers(raw),
            input_data: raw.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// Display strings echoing the submitted attributes.
fn build_drivers(raw: &RawRecord) -> Vec<String> {
    vec![
        format!("Comuna: {}", raw.comuna),
        format!("Tipo de Accidente: {}", raw.tipo_accidente),
        format!("Periodo: {}", raw.fecha),
    ]
}

/// Batch payload shape: a list of records under `accidents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInput {
    pub accidents: Vec<RawRecord>,
}
