//! Artifact Store - Snapshot Loading & Publishing
//!
//! Loads the four exported artifact files and publishes them as one
//! immutable snapshot. Readers clone an `Arc` and can never observe a
//! half-loaded state; a failed load publishes "unavailable" instead of
//! keeping earlier fields around.

pub mod schema;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::{BUNDLE_FILE, LREG_MODEL_FILE, RF_MODEL_FILE, SCALER_FILE};
use crate::error::ArtifactError;
use crate::logic::model::{ForestModel, LogisticModel};

use self::schema::{column_layout_hash, ModelMetrics, ModelSchema, SchemaBundle, StandardScaler};

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Everything one successful load produced. Immutable after construction.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub lreg: LogisticModel,
    pub rf: ForestModel,
    pub scaler: StandardScaler,
    pub schema: ModelSchema,
    pub metrics: ModelMetrics,
    pub loaded_at: DateTime<Utc>,
    pub source_dir: PathBuf,
}

impl ArtifactBundle {
    /// Classifier type names, in blend order
    pub fn model_names(&self) -> Vec<String> {
        vec![self.lreg.model_name.clone(), self.rf.model_name.clone()]
    }
}

/// Store state for the status surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStatus {
    pub available: bool,
    pub model_names: Vec<String>,
    pub metrics: Option<ModelMetrics>,
    pub feature_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

// ============================================================================
// STORE
// ============================================================================

/// One store instance per process; all scoring reads go through it.
///
/// Load builds the whole bundle off to the side and publishes it with a
/// single write. A later failed reload leaves the store unavailable
/// rather than serving the stale snapshot.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    snapshot: RwLock<Option<Arc<ArtifactBundle>>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all four artifacts from `dir` and publish the snapshot.
    pub fn load(&self, dir: impl AsRef<Path>) -> Result<Arc<ArtifactBundle>, ArtifactError> {
        let dir = dir.as_ref();
        match load_bundle(dir) {
            Ok(bundle) => {
                let bundle = Arc::new(bundle);
                *self.snapshot.write() = Some(bundle.clone());
                log::info!(
                    "artifact snapshot published from {}: models [{}], {} features",
                    dir.display(),
                    bundle.model_names().join(", "),
                    bundle.schema.n_features()
                );
                Ok(bundle)
            }
            Err(err) => {
                *self.snapshot.write() = None;
                log::warn!("artifact load from {} failed: {err}", dir.display());
                Err(err)
            }
        }
    }

    /// Current snapshot, if any. Cheap to call per request.
    pub fn snapshot(&self) -> Option<Arc<ArtifactBundle>> {
        self.snapshot.read().clone()
    }

    pub fn is_available(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Availability, model names and shipped metrics in one read.
    pub fn status(&self) -> StoreStatus {
        match self.snapshot() {
            Some(bundle) => StoreStatus {
                available: true,
                model_names: bundle.model_names(),
                metrics: Some(bundle.metrics.clone()),
                feature_count: bundle.schema.n_features(),
                loaded_at: Some(bundle.loaded_at),
            },
            None => StoreStatus {
                available: false,
                model_names: Vec::new(),
                metrics: None,
                feature_count: 0,
                loaded_at: None,
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn publish_for_tests(&self, bundle: ArtifactBundle) {
        *self.snapshot.write() = Some(Arc::new(bundle));
    }
}

// ============================================================================
// LOADING
// ============================================================================

fn load_bundle(dir: &Path) -> Result<ArtifactBundle, ArtifactError> {
    let lreg: LogisticModel = read_json(&dir.join(LREG_MODEL_FILE))?;
    let rf: ForestModel = read_json(&dir.join(RF_MODEL_FILE))?;
    let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
    let bundle: SchemaBundle = read_json(&dir.join(BUNDLE_FILE))?;

    validate_bundle(&lreg, &rf, &scaler, &bundle)?;

    Ok(ArtifactBundle {
        lreg,
        rf,
        scaler,
        schema: bundle.schema,
        metrics: bundle.metrics,
        loaded_at: Utc::now(),
        source_dir: dir.to_path_buf(),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ArtifactError::missing(path)
        } else {
            ArtifactError::io(path, e)
        }
    })?;
    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::parse(path, e))
}

/// Cross-artifact consistency checks.
///
/// The three length contracts are what keep a silently misaligned bundle
/// from scoring: scaler width vs numeric columns, classifier width vs
/// the post-expansion column list, and the optional layout hash.
fn validate_bundle(
    lreg: &LogisticModel,
    rf: &ForestModel,
    scaler: &StandardScaler,
    bundle: &SchemaBundle,
) -> Result<(), ArtifactError> {
    let schema = &bundle.schema;

    if scaler.mean.len() != scaler.scale.len() {
        return Err(ArtifactError::inconsistent(format!(
            "scaler mean/scale lengths differ: {} vs {}",
            scaler.mean.len(),
            scaler.scale.len()
        )));
    }
    if scaler.len() != schema.num_cols.len() {
        return Err(ArtifactError::inconsistent(format!(
            "scaler covers {} columns, schema lists {} numeric columns",
            scaler.len(),
            schema.num_cols.len()
        )));
    }

    lreg.validate().map_err(ArtifactError::inconsistent)?;
    rf.validate().map_err(ArtifactError::inconsistent)?;

    for (name, n) in [
        (lreg.model_name.as_str(), lreg.n_features),
        (rf.model_name.as_str(), rf.n_features),
    ] {
        if n != schema.n_features() {
            return Err(ArtifactError::inconsistent(format!(
                "{name} expects {n} features, schema lists {}",
                schema.n_features()
            )));
        }
    }

    if let Some(expected) = bundle.layout_hash {
        let actual = column_layout_hash(&schema.feature_cols);
        if actual != expected {
            return Err(ArtifactError::inconsistent(format!(
                "column layout hash mismatch: bundle says {expected:08x}, columns hash to {actual:08x}"
            )));
        }
    }

    Ok(())
}
