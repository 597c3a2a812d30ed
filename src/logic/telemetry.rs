//! Scoring Telemetry
//!
//! Degradation counters for data-quality drift: bad dates, vocabulary
//! the model never saw, numeric columns the input could not feed. These
//! are observations, not errors; scoring continues and the counters let
//! operators notice drift. Owned by the pipeline instance, no globals.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::logic::features::BuildReport;

/// Running counters, safe to bump from concurrent requests.
#[derive(Debug, Default)]
pub struct ScoringTelemetry {
    records_scored: AtomicU64,
    date_fallbacks: AtomicU64,
    unknown_categories: AtomicU64,
    missing_numeric_defaults: AtomicU64,
}

impl ScoringTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one build's degradation counts into the running totals.
    pub fn record_build(&self, report: &BuildReport) {
        self.records_scored
            .fetch_add(report.records, Ordering::Relaxed);
        self.date_fallbacks
            .fetch_add(report.date_fallbacks, Ordering::Relaxed);
        self.unknown_categories
            .fetch_add(report.unknown_categories, Ordering::Relaxed);
        self.missing_numeric_defaults
            .fetch_add(report.missing_numeric_defaults, Ordering::Relaxed);
    }

    /// Numeric cells that arrived unparseable and were defaulted to 0
    /// before the build (delimited input path).
    pub fn note_missing_numeric(&self, n: u64) {
        self.missing_numeric_defaults.fetch_add(n, Ordering::Relaxed);
    }

    /// Point-in-time counter values for the status surface.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            records_scored: self.records_scored.load(Ordering::Relaxed),
            date_fallbacks: self.date_fallbacks.load(Ordering::Relaxed),
            unknown_categories: self.unknown_categories.load(Ordering::Relaxed),
            missing_numeric_defaults: self.missing_numeric_defaults.load(Ordering::Relaxed),
        }
    }
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub records_scored: u64,
    pub date_fallbacks: u64,
    pub unknown_categories: u64,
    pub missing_numeric_defaults: u64,
}
