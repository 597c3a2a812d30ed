//! Service Status Surface
//!
//! Read-only DTO assembled from the artifact store and the scoring
//! telemetry. The HTTP layer serializes this as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, APP_VERSION};
use crate::logic::artifacts::schema::ModelMetrics;
use crate::logic::pipeline::Pipeline;
use crate::logic::telemetry::TelemetrySnapshot;

/// Wire value when artifacts are loaded and scoring works
pub const STATUS_OPERATIONAL: &str = "operational";

/// Wire value when no artifact snapshot is published
pub const STATUS_UNAVAILABLE: &str = "unavailable";

/// Everything the status query reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub service: String,
    pub version: String,
    /// "operational" | "unavailable"
    pub status: String,
    /// Classifier type names, empty when unavailable
    pub models_loaded: Vec<String>,
    /// Offline evaluation metrics shipped with the artifacts
    pub metrics: Option<ModelMetrics>,
    /// Post-expansion feature count, 0 when unavailable
    pub feature_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub telemetry: TelemetrySnapshot,
}

/// Assemble the current status in one pass.
pub fn service_status(pipeline: &Pipeline) -> ServiceStatus {
    let store = pipeline.store().status();
    ServiceStatus {
        service: APP_NAME.to_string(),
        version: APP_VERSION.to_string(),
        status: if store.available {
            STATUS_OPERATIONAL
        } else {
            STATUS_UNAVAILABLE
        }
        .to_string(),
        models_loaded: store.model_names,
        metrics: store.metrics,
        feature_count: store.feature_count,
        loaded_at: store.loaded_at,
        telemetry: pipeline.telemetry_snapshot(),
    }
}
