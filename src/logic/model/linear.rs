//! Logistic Regression Evaluation
//!
//! Evaluates the exported coefficient vector from `modelo_lreg.json`.
//! Inference is a dot product and a sigmoid; nothing here is fit or
//! updated at runtime.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Exported logistic regression parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Training-library class name, surfaced by the status query
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Width of the aligned feature matrix this model expects
    pub n_features: usize,
    /// One weight per feature column, in schema order
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

fn default_model_name() -> String {
    "LogisticRegression".to_string()
}

impl LogisticModel {
    /// Structural check, run at artifact load.
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficients.len() != self.n_features {
            return Err(format!(
                "logistic regression carries {} coefficients for {} features",
                self.coefficients.len(),
                self.n_features
            ));
        }
        Ok(())
    }

    /// Positive-class probability per row.
    pub fn positive_probabilities(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
        x.outer_iter()
            .map(|row| {
                let z: f64 = self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(xi, wi)| xi * wi)
                        .sum::<f64>();
                sigmoid(z)
            })
            .collect()
    }
}

/// Numerically stable logistic sigmoid.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid_midpoint_and_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-15);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
        assert!(sigmoid(-800.0) >= 0.0);
    }

    #[test]
    fn test_known_coefficients() {
        let model = LogisticModel {
            model_name: "LogisticRegression".to_string(),
            n_features: 2,
            coefficients: vec![2.0, 0.0],
            intercept: -1.0,
        };
        let x = array![[1.0, 5.0], [0.0, 5.0]];
        let p = model.positive_probabilities(x.view());
        // z = 1 and z = -1
        assert!((p[0] - 0.731_058_578_630_004_9).abs() < 1e-12);
        assert!((p[1] - 0.268_941_421_369_995_1).abs() < 1e-12);
    }

    #[test]
    fn test_zero_model_scores_half() {
        let model = LogisticModel {
            model_name: "LogisticRegression".to_string(),
            n_features: 3,
            coefficients: vec![0.0; 3],
            intercept: 0.0,
        };
        let x = array![[9.0, -4.0, 2.0]];
        let p = model.positive_probabilities(x.view());
        assert!((p[0] - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_validate_rejects_width_mismatch() {
        let model = LogisticModel {
            model_name: "LogisticRegression".to_string(),
            n_features: 3,
            coefficients: vec![0.0; 2],
            intercept: 0.0,
        };
        assert!(model.validate().is_err());
    }
}
