//! Random Forest Evaluation
//!
//! Evaluates the flattened tree arrays exported to `modelo_rf.json`.
//! Each tree routes a row to a leaf (`x[feature] <= threshold` goes
//! left), the leaf's positive-class weight fraction is that tree's
//! probability, and the forest averages tree probabilities.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// One node of a flattened decision tree.
///
/// Leaves carry `-1` in `feature`, `left` and `right`. Internal nodes
/// always point at children with larger indices, so descent terminates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Split feature index; -1 on leaves
    pub feature: i32,
    pub threshold: f64,
    /// Left child index; -1 on leaves
    pub left: i32,
    /// Right child index; -1 on leaves
    pub right: i32,
    /// Per-class sample weights at this node: [negative, positive]
    pub value: [f64; 2],
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.left < 0
    }

    /// Positive-class fraction of the samples that reached this node
    pub fn positive_fraction(&self) -> f64 {
        let total = self.value[0] + self.value[1];
        if total > 0.0 {
            self.value[1] / total
        } else {
            0.0
        }
    }
}

/// One exported decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Route a row from the root to its leaf.
    fn leaf_probability(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node.positive_fraction();
            }
            idx = if row[node.feature as usize] <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    /// Structural check, run at artifact load.
    ///
    /// Rejects empty trees, half-leaf nodes, out-of-range children or
    /// features, and children that do not move forward in the array
    /// (forward-only children are what make `leaf_probability` finite).
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let len = self.nodes.len() as i32;
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.right >= 0 {
                    return Err(format!("node {idx} is half leaf"));
                }
                continue;
            }
            if node.right < 0 {
                return Err(format!("node {idx} is half leaf"));
            }
            if node.feature < 0 || node.feature as usize >= n_features {
                return Err(format!(
                    "node {idx} splits on feature {} of {n_features}",
                    node.feature
                ));
            }
            let idx = idx as i32;
            if node.left <= idx || node.left >= len || node.right <= idx || node.right >= len {
                return Err(format!("node {idx} has out-of-order children"));
            }
        }
        Ok(())
    }
}

/// Exported random forest parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    /// Training-library class name, surfaced by the status query
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Width of the aligned feature matrix this model expects
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

fn default_model_name() -> String {
    "RandomForestClassifier".to_string()
}

impl ForestModel {
    /// Structural check, run at artifact load.
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest export contains no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    /// Positive-class probability per row, averaged over trees.
    pub fn positive_probabilities(&self, x: ArrayView2<'_, f64>) -> Vec<f64> {
        let n_trees = self.trees.len() as f64;
        x.outer_iter()
            .map(|row| {
                let sum: f64 = self.trees.iter().map(|t| t.leaf_probability(row)).sum();
                sum / n_trees
            })
            .collect()
    }
}
