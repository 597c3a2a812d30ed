//! Schema Bundle - Trained Column Contract
//!
//! Deserialized forms of `scaler.json` and `model_artifacts.json`. The
//! post-expansion column list in here is the single source of truth for
//! what the classifiers were fit on; every feature matrix fed to them
//! must match it name-for-name, in order.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// MODEL SCHEMA
// ============================================================================

/// Column contract the classifiers were fit on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Numeric columns, in the order the scaler was fit on
    pub num_cols: Vec<String>,
    /// Categorical columns expanded into indicator columns
    pub cat_cols: Vec<String>,
    /// Full post-expansion column list, in classifier input order
    #[serde(rename = "feature_cols_post_dummies")]
    pub feature_cols: Vec<String>,
}

impl ModelSchema {
    /// An empty schema cannot drive feature building
    pub fn is_empty(&self) -> bool {
        self.feature_cols.is_empty()
    }

    /// Width of the classifier input this schema produces
    pub fn n_features(&self) -> usize {
        self.feature_cols.len()
    }

    /// Indicator column name produced for one categorical value
    pub fn indicator_name(column: &str, value: &str) -> String {
        format!("{column}_{value}")
    }
}

// ============================================================================
// OFFLINE METRICS
// ============================================================================

/// Evaluation metrics computed offline and shipped with the artifacts.
/// Surfaced by the status query, never recomputed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub auroc: Option<f64>,
    pub auprc: Option<f64>,
    pub brier_score: Option<f64>,
}

// ============================================================================
// SCHEMA BUNDLE (on-disk shape of model_artifacts.json)
// ============================================================================

/// Everything `model_artifacts.json` carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaBundle {
    #[serde(flatten)]
    pub schema: ModelSchema,
    pub metrics: ModelMetrics,
    /// CRC32 over the post-expansion column list, written by the exporter.
    /// When present, load re-derives it and rejects an edited bundle.
    #[serde(default)]
    pub layout_hash: Option<u32>,
}

/// Compute the CRC32 layout hash of an ordered column list.
pub fn column_layout_hash(columns: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in columns {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

// ============================================================================
// STANDARD SCALER
// ============================================================================

/// Fitted standard scaler parameters, parallel to [`ModelSchema::num_cols`].
///
/// Array lengths are validated against the schema at load; callers may
/// index by numeric-column position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Identity transform over `n` columns (mean 0, scale 1)
    pub fn identity(n: usize) -> Self {
        Self {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// `(v - mean) / scale` for numeric column `j`.
    ///
    /// A zero scale entry is treated as 1.0, the zero-variance column
    /// convention the exporter inherits from its training library.
    pub fn transform_value(&self, j: usize, v: f64) -> f64 {
        let scale = if self.scale[j] == 0.0 { 1.0 } else { self.scale[j] };
        (v - self.mean[j]) / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_indicator_name() {
        assert_eq!(ModelSchema::indicator_name("Comuna", "NUNOA"), "Comuna_NUNOA");
        assert_eq!(
            ModelSchema::indicator_name("Claseaccid", "Colision"),
            "Claseaccid_Colision"
        );
    }

    #[test]
    fn test_layout_hash_consistency() {
        let columns = cols(&["Leves", "Comuna_NUNOA"]);
        assert_eq!(column_layout_hash(&columns), column_layout_hash(&columns));
    }

    #[test]
    fn test_layout_hash_order_sensitive() {
        let ab = cols(&["Leves", "Comuna_NUNOA"]);
        let ba = cols(&["Comuna_NUNOA", "Leves"]);
        assert_ne!(column_layout_hash(&ab), column_layout_hash(&ba));
    }

    #[test]
    fn test_scaler_transform() {
        let scaler = StandardScaler {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 1.0],
        };
        assert!((scaler.transform_value(0, 14.0) - 2.0).abs() < 1e-12);
        assert!((scaler.transform_value(1, 3.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_scaler_zero_scale_is_identity() {
        let scaler = StandardScaler {
            mean: vec![5.0],
            scale: vec![0.0],
        };
        assert!((scaler.transform_value(0, 8.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_bundle_parses_exporter_keys() {
        let json = r#"{
            "num_cols": ["Leves"],
            "cat_cols": ["Comuna"],
            "feature_cols_post_dummies": ["Leves", "Comuna_NUNOA"],
            "metrics": {"auroc": 0.88, "auprc": 0.36, "brier_score": null}
        }"#;
        let bundle: SchemaBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.schema.n_features(), 2);
        assert_eq!(bundle.metrics.auroc, Some(0.88));
        assert_eq!(bundle.metrics.brier_score, None);
        assert!(bundle.layout_hash.is_none());
    }
}
