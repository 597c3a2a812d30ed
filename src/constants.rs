//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the artifact directory or scoring thresholds, only edit this file.

/// Default directory holding the exported model artifacts
///
/// This is the fallback path when no environment variable is set.
/// Relative paths resolve against the process working directory.
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Logistic regression export filename
pub const LREG_MODEL_FILE: &str = "modelo_lreg.json";

/// Random forest export filename
pub const RF_MODEL_FILE: &str = "modelo_rf.json";

/// Fitted standard scaler filename
pub const SCALER_FILE: &str = "scaler.json";

/// Schema-and-metrics bundle filename
pub const BUNDLE_FILE: &str = "model_artifacts.json";

/// Ensemble weight applied to the logistic regression probability
pub const LREG_BLEND_WEIGHT: f64 = 0.5;

/// Ensemble weight applied to the random forest probability
pub const RF_BLEND_WEIGHT: f64 = 0.5;

/// Scores strictly above this are high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

/// Scores strictly above this (and not high) are medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.25;

/// Year substituted when an incident date cannot be parsed
pub const FALLBACK_YEAR: f64 = 2021.0;

/// Month substituted when an incident date cannot be parsed
pub const FALLBACK_MONTH: f64 = 1.0;

/// Weekday substituted when an incident date cannot be parsed (0 = Monday)
pub const FALLBACK_WEEKDAY: f64 = 0.0;

/// Placeholder for missing categorical values
pub const UNKNOWN_CATEGORY: &str = "desconocido";

/// Class label synthesized when a record carries no accident type at all
pub const DEFAULT_CLASS_LABEL: &str = "Accidente";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Riesgo-Core";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the model artifact directory from environment or use default
pub fn get_model_dir() -> String {
    std::env::var("RIESGO_MODEL_DIR").unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_weights_sum_to_one() {
        assert!((LREG_BLEND_WEIGHT + RF_BLEND_WEIGHT - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_ordering() {
        assert!(MEDIUM_RISK_THRESHOLD < HIGH_RISK_THRESHOLD);
    }
}
