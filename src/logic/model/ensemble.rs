//! Two-Classifier Ensemble
//!
//! Blends both classifiers' positive-class probabilities with fixed
//! weights. The weights are deployment constants; changing them means
//! re-exporting, not a runtime knob.

use ndarray::ArrayView2;

use crate::constants::{LREG_BLEND_WEIGHT, RF_BLEND_WEIGHT};
use crate::logic::model::forest::ForestModel;
use crate::logic::model::linear::LogisticModel;

/// Read-only probability model over an aligned feature matrix.
///
/// Both exported models implement this; tests substitute mocks.
pub trait Classifier: Send + Sync {
    /// Model type name surfaced by the status query
    fn name(&self) -> &str;

    /// Width of the aligned feature matrix this model expects
    fn n_features(&self) -> usize;

    /// Positive-class probability per row, each in [0, 1]
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Vec<f64>;
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
        self.positive_probabilities(x)
    }
}

impl Classifier for ForestModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
        self.positive_probabilities(x)
    }
}

/// Blend both classifiers over one aligned matrix, one score per row.
///
/// Scores stay in [0, 1]: each input probability is, and the weights are
/// a convex combination.
pub fn blend(lreg: &dyn Classifier, rf: &dyn Classifier, x: ArrayView2<'_, f64>) -> Vec<f64> {
    debug_assert_eq!(x.ncols(), lreg.n_features());
    debug_assert_eq!(x.ncols(), rf.n_features());
    let p_lreg = lreg.predict_proba(x);
    let p_rf = rf.predict_proba(x);
    p_lreg
        .iter()
        .zip(&p_rf)
        .map(|(a, b)| LREG_BLEND_WEIGHT * a + RF_BLEND_WEIGHT * b)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Fixed-output classifier for blend arithmetic tests
    struct Constant(f64);

    impl Classifier for Constant {
        fn name(&self) -> &str {
            "Constant"
        }

        fn n_features(&self) -> usize {
            2
        }

        fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
            vec![self.0; x.nrows()]
        }
    }

    #[test]
    fn test_blend_is_the_documented_average() {
        let x = array![[0.0, 0.0]];
        let scores = blend(&Constant(0.8), &Constant(0.4), x.view());
        assert_eq!(scores.len(), 1);
        assert!((scores[0] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_blend_per_row() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        let scores = blend(&Constant(1.0), &Constant(0.0), x.view());
        for s in scores {
            assert!((s - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_blend_deterministic_with_real_models() {
        let lreg = LogisticModel {
            model_name: "LogisticRegression".to_string(),
            n_features: 2,
            coefficients: vec![0.7, -1.3],
            intercept: 0.2,
        };
        let rf = ForestModel {
            model_name: "RandomForestClassifier".to_string(),
            n_features: 2,
            trees: vec![crate::logic::model::forest::DecisionTree {
                nodes: vec![crate::logic::model::forest::TreeNode {
                    feature: -1,
                    threshold: 0.0,
                    left: -1,
                    right: -1,
                    value: [1.0, 3.0],
                }],
            }],
        };
        let x = array![[0.3, -0.9], [1.4, 0.1]];
        let a = blend(&lreg, &rf, x.view());
        let b = blend(&lreg, &rf, x.view());
        assert_eq!(a, b);
        for s in a {
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_empty_matrix_yields_no_scores() {
        let x = ndarray::Array2::<f64>::zeros((0, 2));
        assert!(blend(&Constant(0.9), &Constant(0.1), x.view()).is_empty());
    }
}
